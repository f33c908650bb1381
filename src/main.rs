use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use handmade_store::{app, bootstrap, config::Config, connect};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = Config::from_env()?;

    let db = connect(&config).await?;
    bootstrap(&db, &config).await?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!(addr = %listener.local_addr()?, "Storefront listening");

    let app = app(Arc::new(db), Arc::new(config));
    axum::serve(listener, app).await?;

    Ok(())
}
