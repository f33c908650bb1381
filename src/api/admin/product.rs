use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::logging::to_response;
use crate::services::admin::{self, CreateProduct, PatchProduct};

//ROUTERS
pub fn admin_product_router() -> Router {
    Router::new()
        .route("/product", get(list_products).post(create_product))
        .route(
            "/product/:id",
            get(admin_get_product)
                .patch(patch_product)
                .delete(delete_product),
        )
}

//ROUTES
async fn list_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match admin::list_products(&*db).await {
        Ok(products) => to_response(Json(products), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn admin_get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match admin::get_product(&*db, id).await {
        Ok(product) => to_response(Json(product), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> Response {
    match admin::create_product(&*db, payload).await {
        Ok(product) => to_response((StatusCode::CREATED, Json(product)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
) -> Response {
    match admin::patch_product(&*db, id, payload).await {
        Ok(product) => to_response(Json(product), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match admin::delete_product(&*db, id).await {
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
