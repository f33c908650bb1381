use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::{str::FromStr, sync::Arc};

use crate::entities::order::Status;
use crate::error::StoreError;
use crate::middleware::logging::to_response;
use crate::services::admin;

pub fn admin_order_router() -> Router {
    Router::new()
        .route("/order", get(list_orders))
        .route("/order/:id", get(get_order).patch(patch_order))
}

#[derive(Deserialize)]
struct OrderFilter {
    status: Option<String>,
}

#[derive(Deserialize)]
struct PatchOrder {
    status: Status,
}

async fn list_orders(
    Query(params): Query<OrderFilter>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let status = match params.status.as_deref().map(Status::from_str).transpose() {
        Ok(status) => status,
        Err(message) => return StoreError::invalid("status", message).into_response(),
    };

    match admin::list_orders(&*db, status).await {
        Ok(orders) => to_response(Json(orders), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match admin::get_order(&*db, id).await {
        Ok(detail) => to_response(Json(detail), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn patch_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchOrder>,
) -> Response {
    match admin::set_order_status(&*db, id, payload.status).await {
        Ok(order) => to_response(Json(order), Ok(())),
        Err(err) => err.into_response(),
    }
}
