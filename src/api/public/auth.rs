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

use crate::config::Config;
use crate::error::StoreError;
use crate::middleware::{
    auth::generate_token,
    logging::{to_response, ApiError},
};
use crate::services::auth::{self, LoginForm, RegisterForm};

pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<RegisterForm>,
) -> Response {
    let user = match auth::register(&*db, &payload).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    // Registration logs the new user in straight away.
    match generate_token(user.id, user.role, &config) {
        Ok(token) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Registration successful!",
                    "user_id": user.id,
                    "token": token
                })),
            ),
            Ok(()),
        ),
        Err(err) => StoreError::Internal(err.to_string()).into_response(),
    }
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<LoginForm>,
) -> Response {
    let user = match auth::authenticate(&*db, &payload).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match generate_token(user.id, user.role, &config) {
        Ok(token) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Login successful!",
                    "token": token
                })),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::General(err.to_string())),
        ),
    }
}
