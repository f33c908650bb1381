use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::entities::image::FileExtension;
use crate::middleware::logging::{to_response, ApiError};
use crate::services::media;

static FILE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,100}$").unwrap());

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn upload_router(file_size_limit: usize) -> Router {
    Router::new()
        .route("/image", post(upload))
        .layer(DefaultBodyLimit::max(file_size_limit + MULTIPART_OVERHEAD))
}

fn bad_request(status: StatusCode, message: &str) -> Response {
    to_response(
        (status, Json(json!({ "error": message }))),
        Err(ApiError::General(message.to_string())),
    )
}

/// Accepts the first field of a multipart body. The field name becomes the
/// image's display name.
async fn upload(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    mut multipart: Multipart,
) -> Response {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return bad_request(StatusCode::BAD_REQUEST, "No file was sent."),
        Err(err) => return bad_request(StatusCode::BAD_REQUEST, &err.body_text()),
    };

    let extension = match field.content_type().and_then(FileExtension::from_content_type) {
        Some(extension) => extension,
        None => return bad_request(StatusCode::BAD_REQUEST, "Unsupported content type."),
    };

    let file_name = match field.name() {
        Some(name) if FILE_NAME_REGEX.is_match(name) => name.to_owned(),
        Some(_) => {
            return bad_request(
                StatusCode::BAD_REQUEST,
                "Invalid file name. It should contain only Latin letters, numbers, '-', or '_'.",
            )
        }
        None => return bad_request(StatusCode::BAD_REQUEST, "File name is not set."),
    };

    let data = match field.bytes().await {
        Ok(data) => data,
        Err(err) => return bad_request(StatusCode::BAD_REQUEST, &err.body_text()),
    };
    if data.len() > config.file_size_limit {
        return bad_request(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");
    }

    match media::store_image(&*db, &config.upload_dir, &file_name, extension, &data).await {
        Ok(image) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "File uploaded successfully.",
                    "id": image.id,
                    "file_name": image.file_name
                })),
            ),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}
