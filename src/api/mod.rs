pub mod admin;
pub mod public;
pub mod user;

use axum::{extract::Extension, middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::logging::logging_middleware;
use admin::admin_api_router;
use public::{public_api_router, public_auth_router};
use user::user_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let api = Router::new()
        .merge(public_api_router())
        .merge(user_api_router(shared_db.clone(), config.clone()))
        .nest("/admin", admin_api_router(shared_db.clone(), config.clone()));

    Router::new()
        .merge(public_auth_router())
        .nest("/api", api)
        .layer(from_fn(logging_middleware))
        .layer(Extension(shared_db))
        .layer(Extension(config))
        .layer(TraceLayer::new_for_http())
}
