use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::logging::to_response;
use crate::services::catalog;

pub fn search_router() -> Router {
    Router::new().route("/search", get(search_products))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn search_products(
    Query(params): Query<SearchQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let query = params.q.unwrap_or_default();
    match catalog::search_products(&*db, Some(query.as_str())).await {
        Ok(products) => to_response(
            Json(json!({
                "query": query,
                "products": products
            })),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}
