use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::product::ListingQuery;
use crate::middleware::logging::to_response;
use crate::services::catalog::{self, SortKey};

pub fn category_router() -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/:slug", get(get_category_products))
}

async fn get_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match catalog::list_categories(&*db).await {
        Ok(categories) => to_response(Json(categories), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_category_products(
    Path(slug): Path<String>,
    Query(params): Query<ListingQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let sort = SortKey::parse(params.sort.as_deref());
    match catalog::list_category_products(&*db, &slug, sort, params.page.as_deref()).await {
        Ok(page) => to_response(Json(page), Ok(())),
        Err(err) => err.into_response(),
    }
}
