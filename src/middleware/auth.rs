use crate::config::Config;
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::logging::{to_response, ApiError};
use crate::services::auth::is_revoked;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return reject(AuthMiddlewareError::MissingToken),
    };

    let claims = match validate_token(&state, token).await {
        Ok(claims) => claims,
        Err(err) => {
            debug!(error = %err, "Rejected bearer token");
            return reject(err);
        }
    };

    req.extensions_mut().insert(claims);
    next.run(req).await
}

fn reject(err: AuthMiddlewareError) -> Response {
    let status = match err {
        AuthMiddlewareError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        AuthMiddlewareError::InvalidUserOrRole => StatusCode::FORBIDDEN,
        _ => StatusCode::UNAUTHORIZED,
    };
    to_response(
        (status, Json(json!({ "error": err.to_string() }))),
        Err(ApiError::Unauthorized(err.to_string())),
    )
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub jti: String,
    pub exp: usize,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp as i64, 0).unwrap_or_else(Utc::now)
    }
}

/// What a router needs to check tokens: the database, the signing secret and
/// the roles allowed through.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub roles: &'static [Role],
}

pub fn generate_token(
    user_id: i32,
    role: Role,
    config: &Config,
) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(config.token_ttl_hours))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        user_id,
        role: role.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub async fn validate_token(state: &AuthState, token: &str) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::TokenExpired)?
    .claims;

    let role = Role::from_str(&claims.role).map_err(|_| AuthMiddlewareError::ValidationFail)?;
    if !state.roles.contains(&role) {
        return Err(AuthMiddlewareError::InvalidUserOrRole);
    }

    if is_revoked(&*state.db, &claims.jti)
        .await
        .map_err(|_| AuthMiddlewareError::InternalServerError)?
    {
        return Err(AuthMiddlewareError::Revoked);
    }

    match UserEntity::find_by_id(claims.user_id)
        .filter(user::Column::Role.eq(role))
        .one(&*state.db)
        .await
    {
        Ok(Some(_)) => Ok(claims),
        Ok(None) => Err(AuthMiddlewareError::ValidationFail),
        Err(_) => Err(AuthMiddlewareError::InternalServerError),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Token expired or malformed")]
    TokenExpired,
    #[error("Token has been revoked")]
    Revoked,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error")]
    InternalServerError,
}
