use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::middleware::logging::{to_response, ApiError};

/// Field name to the messages collected for it. Errors not tied to a single
/// field are stored under [`NON_FIELD`].
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const NON_FIELD: &str = "__all__";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("validation failed: {0:?}")]
    ValidationFailed(FieldErrors),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage aborted: {0}")]
    Aborted(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// A validation failure carrying one message for one field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::ValidationFailed(errors)
    }

    /// Maps constraint violations to `Conflict`, anything else to `Aborted`.
    pub fn from_write(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict(format!("{what} already exists"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::Conflict(format!("{what} is referenced by other records"))
            }
            // SQLite reports RESTRICT actions as SQLITE_CONSTRAINT_TRIGGER (1811),
            // which sea-orm does not classify.
            None if err.to_string().contains("FOREIGN KEY constraint failed") => {
                Self::Conflict(format!("{what} is referenced by other records"))
            }
            _ => Self::Aborted(err),
        }
    }
}

/// Flattens validator output into field name -> messages.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => err.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(field_errors(&errors))
    }
}

impl From<&StoreError> for ApiError {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what.clone()),
            StoreError::ValidationFailed(fields) => ApiError::ValidationFail(
                fields.keys().cloned().collect::<Vec<_>>().join(", "),
            ),
            StoreError::InvalidCredentials => ApiError::Unauthorized("bad credentials".into()),
            StoreError::Conflict(what) => ApiError::Conflict(what.clone()),
            StoreError::Aborted(db) => ApiError::DbError(db.to_string()),
            StoreError::Internal(msg) => ApiError::General(msg.clone()),
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let ext = Err(ApiError::from(&self));
        let (status, body) = match self {
            StoreError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found") }),
            ),
            StoreError::ValidationFailed(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            StoreError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "Invalid username or password.",
                    "fields": { NON_FIELD: ["Invalid username or password."] }
                }),
            ),
            StoreError::Conflict(what) => (StatusCode::CONFLICT, json!({ "error": what })),
            StoreError::Aborted(_) | StoreError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        to_response((status, Json(body)), ext)
    }
}
