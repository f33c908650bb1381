use axum::routing::get;
use axum::{
    extract::{Extension, Path},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::config::Config;
use crate::middleware::logging::{to_response, ApiError};
use crate::services::media;

pub fn uploads_router() -> Router {
    Router::new().route("/image/:id", get(print_image))
}

pub async fn print_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
) -> Response {
    let path = match media::image_path(&*db, &config.upload_dir, id).await {
        Ok(path) => path,
        Err(err) => return err.into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": "Image not found"
                    })),
                ),
                Err(ApiError::General(err.to_string())),
            )
        }
    };

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    to_response((headers, body), Ok(()))
}
