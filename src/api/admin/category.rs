use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{patch, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::logging::to_response;
use crate::services::admin::{self, CreateCategory, PatchCategory};

//ROUTERS
pub fn admin_category_router() -> Router {
    Router::new()
        .route("/category", post(create_category))
        .route("/category/:id", patch(patch_category).delete(delete_category))
}

//ROUTES
async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateCategory>,
) -> Response {
    match admin::create_category(&*db, payload).await {
        Ok(category) => to_response((StatusCode::CREATED, Json(category)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCategory>,
) -> Response {
    match admin::patch_category(&*db, id, payload).await {
        Ok(category) => to_response(Json(category), Ok(())),
        Err(err) => err.into_response(),
    }
}

/// Deleting a category takes its products with it.
async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match admin::delete_category(&*db, id).await {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Resource deleted successfully."
                })),
            ),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}
