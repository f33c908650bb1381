mod common;

use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{contact, money, spawn_app};

#[tokio::test]
async fn categories_can_be_managed() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post("/api/admin/category", Some(&admin), json!({ "name": "Paper Goods" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "paper-goods");
    let id = body["id"].as_i64().unwrap();

    let (status, _) = app
        .post("/api/admin/category", Some(&admin), json!({ "name": "Paper Goods" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .patch(
            &format!("/api/admin/category/{id}"),
            Some(&admin),
            json!({ "name": "Stationery", "slug": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "stationery");

    let (status, _) = app.delete(&format!("/api/admin/category/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/api/admin/category/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_are_validated() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let category = app.category("Ceramics").await;

    let (status, body) = app
        .post(
            "/api/admin/product",
            Some(&admin),
            json!({ "name": "Jug", "price": "-1.00", "category_id": category.id }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["price"].is_array());

    let (status, body) = app
        .post(
            "/api/admin/product",
            Some(&admin),
            json!({ "name": "Jug", "price": "14.00", "category_id": 999 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["category_id"].is_array());

    let (status, body) = app
        .post(
            "/api/admin/product",
            Some(&admin),
            json!({
                "name": "Jug",
                "price": "14.00",
                "stock": 3,
                "available": false,
                "category_id": category.id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "jug");
    assert_eq!(money(&body["price"]), dec!(14.00));
    let id = body["id"].as_i64().unwrap();

    // Unavailable products stay visible to the admin.
    let (_, body) = app.get("/api/admin/product", Some(&admin)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (status, body) = app.get(&format!("/api/admin/product/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
}

#[tokio::test]
async fn purchased_products_cannot_be_deleted() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let category = app.category("Ceramics").await;
    let mug = app.product(category.id, "Mug", dec!(10.00)).await;
    let spare = app.product(category.id, "Spare Mug", dec!(10.00)).await;
    let token = app.register("buyer").await;
    app.add_to_cart(&token, mug.id).await;
    app.post("/api/checkout", Some(&token), contact()).await;

    let (status, _) = app
        .delete(&format!("/api/admin/product/{}", mug.id), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .delete(&format!("/api/admin/product/{}", spare.id), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn categories_with_sold_products_cannot_be_deleted() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let ceramics = app.category("Ceramics").await;
    let textiles = app.category("Textiles").await;
    let mug = app.product(ceramics.id, "Mug", dec!(10.00)).await;
    app.product(textiles.id, "Scarf", dec!(30.00)).await;
    let token = app.register("buyer").await;
    app.add_to_cart(&token, mug.id).await;
    app.post("/api/checkout", Some(&token), contact()).await;

    let (status, body) = app
        .delete(&format!("/api/admin/category/{}", ceramics.id), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    // The product is still listed.
    let (status, _) = app.get("/api/products/mug", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .delete(&format!("/api/admin/category/{}", textiles.id), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/products/scarf", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_status_is_the_only_thing_admins_change() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let category = app.category("Ceramics").await;
    let mug = app.product(category.id, "Mug", dec!(10.00)).await;
    let token = app.register("buyer").await;
    app.add_to_cart(&token, mug.id).await;
    let (_, body) = app.post("/api/checkout", Some(&token), contact()).await;
    let order_id = body["order"]["id"].as_i64().unwrap();

    let (_, body) = app.get("/api/admin/order?status=pending", Some(&admin)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .patch(
            &format!("/api/admin/order/{order_id}"),
            Some(&admin),
            json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shipped");
    assert_eq!(money(&body["total_amount"]), dec!(10.00));

    let (_, body) = app.get("/api/admin/order?status=pending", Some(&admin)).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app.get("/api/admin/order?status=lost", Some(&admin)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .patch(
            &format!("/api/admin/order/{order_id}"),
            Some(&admin),
            json!({ "status": "teleported" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = app.get(&format!("/api/orders/{order_id}"), Some(&token)).await;
    assert_eq!(body["order"]["status"], "shipped");
}
