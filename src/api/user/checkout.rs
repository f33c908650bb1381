use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::{auth::Claims, logging::to_response};
use crate::services::checkout::{self, CheckoutForm};

pub fn checkout_router() -> Router {
    Router::new().route("/checkout", get(preview_checkout).post(place_order))
}

async fn preview_checkout(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match checkout::preview(&*db, claims.user_id).await {
        Ok(view) => to_response(Json(view), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn place_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(form): Json<CheckoutForm>,
) -> Response {
    match checkout::checkout(&db, claims.user_id, &form).await {
        Ok(order) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Order placed",
                    "order": order
                })),
            ),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}
