use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use regex::Regex;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::entities::{revoked_token, user};
use crate::error::{field_errors, FieldErrors, StoreError};

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

#[derive(Deserialize, Validate, Debug, Clone, Default)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Required. 150 characters or fewer."),
        regex(path = *USERNAME_REGEX, message = "Letters, digits and @/./+/-/_ only.")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| StoreError::Internal(format!("Failed to hash password: {err}")))?
        .to_string();

    Ok(password_hash)
}

/// Field-level problems with a registration form, empty when it is acceptable.
pub fn validate_registration(form: &RegisterForm) -> FieldErrors {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors(&errors),
    };

    if !form.password.is_empty() && form.password.chars().all(|c| c.is_ascii_digit()) {
        errors
            .entry("password".into())
            .or_default()
            .push("This password is entirely numeric.".into());
    }
    if form.password != form.password_confirm {
        errors
            .entry("password_confirm".into())
            .or_default()
            .push("The two password fields didn't match.".into());
    }

    errors
}

pub async fn register<C: ConnectionTrait>(
    db: &C,
    form: &RegisterForm,
) -> Result<user::Model, StoreError> {
    let form = RegisterForm {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        ..form.clone()
    };

    let errors = validate_registration(&form);
    if !errors.is_empty() {
        return Err(StoreError::ValidationFailed(errors));
    }

    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(&*form.username))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(StoreError::invalid("username", DUPLICATE_USERNAME));
    }

    let new_user = user::ActiveModel {
        username: Set(form.username.clone()),
        email: Set(form.email.clone()),
        password: Set(hash_password(&form.password)?),
        role: Set(user::Role::User),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match user::Entity::insert(new_user).exec_with_returning(db).await {
        Ok(model) => {
            info!(user_id = model.id, username = %model.username, "Registered user");
            Ok(model)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(StoreError::invalid("username", DUPLICATE_USERNAME))
        }
        Err(err) => Err(err.into()),
    }
}

/// Checks credentials. Unknown users and wrong passwords fail the same way.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    form: &LoginForm,
) -> Result<user::Model, StoreError> {
    let user = user::Entity::find()
        .filter(user::Column::Username.eq(form.username.trim()))
        .one(db)
        .await?
        .ok_or(StoreError::InvalidCredentials)?;

    user.check_hash(&form.password)
        .map_err(|_| StoreError::InvalidCredentials)?;

    Ok(user)
}

/// Marks a token id as logged out until the token would have expired anyway.
pub async fn revoke_token<C: ConnectionTrait>(
    db: &C,
    jti: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    revoked_token::Entity::delete_many()
        .filter(revoked_token::Column::ExpiresAt.lt(Utc::now()))
        .exec(db)
        .await?;

    let entry = revoked_token::ActiveModel {
        jti: Set(jti.to_string()),
        expires_at: Set(expires_at),
        ..Default::default()
    };
    match revoked_token::Entity::insert(entry).exec_without_returning(db).await {
        Ok(_) => Ok(()),
        // Logging out twice with the same token.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(()),
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

pub async fn is_revoked<C: ConnectionTrait>(db: &C, jti: &str) -> Result<bool, StoreError> {
    let hits = revoked_token::Entity::find()
        .filter(revoked_token::Column::Jti.eq(jti))
        .count(db)
        .await?;
    Ok(hits > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            username: username.into(),
            email: "maker@example.com".into(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn accepts_a_reasonable_registration() {
        assert!(validate_registration(&form("maker_01", "woolly-socks", "woolly-socks")).is_empty());
    }

    #[test]
    fn rejects_bad_usernames_and_passwords() {
        let errors = validate_registration(&form("no spaces", "12345678", "12345679"));
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("password_confirm"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        let errors = validate_registration(&form("maker", "short", "short"));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn hashes_verify_against_the_plain_password() {
        let hash = hash_password("woolly-socks").expect("hashing should succeed");
        let user = user::Model {
            id: 1,
            username: "maker".into(),
            email: "maker@example.com".into(),
            password: hash,
            role: user::Role::User,
            created_at: Utc::now(),
        };
        assert!(user.check_hash("woolly-socks").is_ok());
        assert!(user.check_hash("cotton-socks").is_err());
    }
}
