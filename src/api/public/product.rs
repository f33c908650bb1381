use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::logging::to_response;
use crate::services::catalog::{self, SortKey};

pub fn product_router() -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:slug", get(get_product))
}

/// `page` stays a raw string so that junk tokens clamp instead of failing
/// extraction.
#[derive(Deserialize, Debug, Default)]
pub struct ListingQuery {
    pub sort: Option<String>,
    pub page: Option<String>,
}

async fn get_products(
    Query(params): Query<ListingQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let sort = SortKey::parse(params.sort.as_deref());
    match catalog::list_products(&*db, sort, params.page.as_deref()).await {
        Ok(page) => to_response(Json(page), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_product(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::get_product(&*db, &slug).await {
        Ok(product) => to_response(Json(product), Ok(())),
        Err(err) => err.into_response(),
    }
}
