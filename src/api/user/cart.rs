use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::{auth::Claims, logging::to_response};
use crate::services::cart;

//ROUTERS
pub fn cart_router() -> Router {
    Router::new().route("/cart", get(get_cart)).route(
        "/cart/:product_id",
        post(add_product)
            .patch(patch_entry)
            .delete(remove_product),
    )
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::view_cart(&*db, claims.user_id).await {
        Ok(view) => to_response(Json(view), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn add_product(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::add_item(&*db, claims.user_id, product_id).await {
        Ok(item) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Added to cart",
                    "item": item
                })),
            ),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}

async fn remove_product(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::remove_item(&*db, claims.user_id, product_id).await {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Removed from cart"
                })),
            ),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}

async fn patch_entry(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchCart>,
) -> Response {
    match cart::update_item(&*db, claims.user_id, product_id, payload.quantity).await {
        Ok(Some(item)) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Cart updated",
                    "item": item
                })),
            ),
            Ok(()),
        ),
        Ok(None) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Removed from cart",
                    "item": null
                })),
            ),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}

#[derive(Deserialize)]
struct PatchCart {
    quantity: i32,
}
