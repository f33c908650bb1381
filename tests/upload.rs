mod common;

use reqwest::{multipart, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::spawn_app;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

fn image_form(name: &str, mime: &str, bytes: Vec<u8>) -> multipart::Form {
    multipart::Form::new().part(
        name.to_string(),
        multipart::Part::bytes(bytes)
            .file_name(format!("{name}.upload"))
            .mime_str(mime)
            .unwrap(),
    )
}

#[tokio::test]
async fn uploaded_images_are_served_back() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .client
        .post(app.url("/api/admin/image"))
        .bearer_auth(&admin)
        .multipart(image_form("teapot", "image/png", PNG_BYTES.to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["file_name"], "teapot");
    let image_id = body["id"].as_i64().unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/image/{image_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(response.bytes().await.unwrap().as_ref(), PNG_BYTES);

    // Products can point at it.
    let category = app.category("Ceramics").await;
    let (status, body) = app
        .post(
            "/api/admin/product",
            Some(&admin),
            json!({
                "name": "Teapot",
                "price": "45.00",
                "category_id": category.id,
                "image_id": image_id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["image_id"], image_id);
}

#[tokio::test]
async fn unsupported_content_types_are_refused() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .client
        .post(app.url("/api/admin/image"))
        .bearer_auth(&admin)
        .multipart(image_form("notes", "text/plain", b"hello".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn shoppers_cannot_upload() {
    let app = spawn_app().await;
    let token = app.register("buyer").await;

    let response = app
        .client
        .post(app.url("/api/admin/image"))
        .bearer_auth(&token)
        .multipart(image_form("teapot", "image/png", PNG_BYTES.to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_images_are_not_found() {
    let app = spawn_app().await;
    let (status, _) = app.get("/api/image/31337", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Referencing one from a product is a field error.
    let admin = app.admin_token().await;
    let category = app.category("Ceramics").await;
    let (status, body) = app
        .post(
            "/api/admin/product",
            Some(&admin),
            json!({
                "name": "Teapot",
                "price": dec!(45.00).to_string(),
                "category_id": category.id,
                "image_id": 31337
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["image_id"].is_array());
}
