pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod services;

use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::api::create_api_router;
use crate::config::Config;
use crate::entities::{seed_admin, setup_schema};
use crate::error::StoreError;

/// Opens the pool and makes sure the schema exists.
///
/// An in-memory SQLite database lives inside a single connection, so the pool
/// is pinned to exactly one for those URLs.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    if config.database_url.contains(":memory:") || config.database_url.contains("mode=memory") {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    setup_schema(&db).await?;
    Ok(db)
}

/// Seeds the configured administrator, if any.
pub async fn bootstrap(db: &DatabaseConnection, config: &Config) -> Result<(), StoreError> {
    if let Some(seed) = &config.admin {
        seed_admin(db, seed).await?;
    }
    Ok(())
}

pub fn app(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    create_api_router(db, config)
}
