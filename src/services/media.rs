use std::path::{Path, PathBuf};

use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::entities::image::{self, FileExtension};
use crate::error::StoreError;

/// Stores an uploaded image on disk and records it. The row is only committed
/// once the file has been written.
pub async fn store_image<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    upload_dir: &Path,
    file_name: &str,
    extension: FileExtension,
    data: &[u8],
) -> Result<image::Model, StoreError> {
    let txn = db.begin().await?;

    let created = image::ActiveModel {
        file_name: Set(file_name.to_string()),
        path_name: Set(Uuid::new_v4().to_string()),
        extension: Set(extension),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|err| StoreError::Internal(format!("Failed to create upload dir: {err}")))?;
    tokio::fs::write(upload_dir.join(created.stored_name()), data)
        .await
        .map_err(|err| StoreError::Internal(format!("Failed to write upload: {err}")))?;

    txn.commit().await?;
    info!(image_id = created.id, file_name, bytes = data.len(), "Stored image");
    Ok(created)
}

/// Location on disk of the image with the given id.
pub async fn image_path<C: ConnectionTrait>(
    db: &C,
    upload_dir: &Path,
    id: i32,
) -> Result<PathBuf, StoreError> {
    let model = image::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Image"))?;
    Ok(upload_dir.join(model.stored_name()))
}
