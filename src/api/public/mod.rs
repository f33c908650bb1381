pub mod auth;
pub mod category;
pub mod product;
pub mod search;
pub mod uploads;

use axum::Router;

use auth::auth_router;
use category::category_router;
use product::product_router;
use search::search_router;
use uploads::uploads_router;

/// Routes reachable without a token, mounted under `/api`.
pub fn public_api_router() -> Router {
    Router::new()
        .merge(category_router())
        .merge(product_router())
        .merge(search_router())
        .merge(uploads_router())
}

/// Registration and login live at the root, outside `/api`.
pub fn public_auth_router() -> Router {
    auth_router()
}
