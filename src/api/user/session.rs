use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::middleware::{auth::Claims, logging::to_response};
use crate::services::auth::revoke_token;

pub fn session_router() -> Router {
    Router::new().route("/logout", post(logout))
}

async fn logout(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match revoke_token(&*db, &claims.jti, claims.expires_at()).await {
        Ok(()) => {
            info!(user_id = claims.user_id, "Logged out");
            to_response(
                (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Logged out"
                    })),
                ),
                Ok(()),
            )
        }
        Err(err) => err.into_response(),
    }
}
