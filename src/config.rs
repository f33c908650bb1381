use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://store.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_FILE_SIZE_LIMIT: usize = 5 * 1024 * 1024;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials of the administrator created on first start.
#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub secret: String,
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub file_size_limit: usize,
    pub token_ttl_hours: i64,
    pub admin: Option<AdminSeed>,
}

impl Config {
    /// Reads `.env` (when present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let secret = env::var("SECRET").map_err(|_| ConfigError::Missing("SECRET"))?;
        if secret.is_empty() {
            return Err(ConfigError::Missing("SECRET"));
        }

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminSeed {
                email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{username}@localhost")),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            file_size_limit: parse_var("FILE_SIZE_LIMIT", DEFAULT_FILE_SIZE_LIMIT)?,
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?,
            admin,
        })
    }

    /// Configuration for tests and local tooling, no environment involved.
    pub fn for_database(database_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            secret: secret.into(),
            bind_addr: "127.0.0.1:0".to_string(),
            upload_dir: env::temp_dir().join("handmade-store-uploads"),
            file_size_limit: DEFAULT_FILE_SIZE_LIMIT,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            admin: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
