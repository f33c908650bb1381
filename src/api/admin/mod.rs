pub mod category;
pub mod order;
pub mod product;
pub mod upload;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use category::admin_category_router;
use order::admin_order_router;
use product::admin_product_router;
use upload::upload_router;

use crate::config::Config;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(admin_category_router())
        .merge(admin_product_router())
        .merge(admin_order_router())
        .merge(upload_router(config.file_size_limit))
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                config,
                roles: &[Role::Admin],
            },
            auth_middleware,
        ))
}
