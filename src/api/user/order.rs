use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::{auth::Claims, logging::to_response};
use crate::services::orders;

pub fn order_router() -> Router {
    Router::new()
        .route("/orders", get(get_orders))
        .route("/orders/:id", get(get_order))
        .route("/profile", get(get_profile))
}

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match orders::list_orders(&*db, claims.user_id).await {
        Ok(orders) => to_response(Json(orders), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match orders::get_order(&*db, claims.user_id, id).await {
        Ok(detail) => to_response(Json(detail), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match orders::profile(&*db, claims.user_id).await {
        Ok(profile) => to_response(Json(profile), Ok(())),
        Err(err) => err.into_response(),
    }
}
