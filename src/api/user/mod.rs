pub mod cart;
pub mod checkout;
pub mod order;
pub mod session;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use cart::cart_router;
use checkout::checkout_router;
use order::order_router;
use session::session_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let shoppers = Router::new()
        .merge(cart_router())
        .merge(checkout_router())
        .merge(order_router())
        .route_layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                config: config.clone(),
                roles: &[Role::User],
            },
            auth_middleware,
        ));

    // Anyone holding a valid token may end their session.
    let sessions = session_router().route_layer(from_fn_with_state(
        AuthState {
            db,
            config,
            roles: &[Role::User, Role::Admin],
        },
        auth_middleware,
    ));

    shoppers.merge(sessions)
}
