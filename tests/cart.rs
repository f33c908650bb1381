mod common;

use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{money, spawn_app};

#[tokio::test]
async fn first_visit_creates_an_empty_cart() {
    let app = spawn_app().await;
    let token = app.register("buyer").await;

    let (status, body) = app.get("/api/cart", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(money(&body["total"]), dec!(0));

    let cart_id = body["cart_id"].clone();
    let (_, body) = app.get("/api/cart", Some(&token)).await;
    assert_eq!(body["cart_id"], cart_id);
}

#[tokio::test]
async fn adding_twice_increments_and_totals_follow() {
    let app = spawn_app().await;
    let category = app.category("Ceramics").await;
    let mug = app.product(category.id, "Mug", dec!(10.00)).await;
    let plate = app.product(category.id, "Plate", dec!(5.00)).await;
    let token = app.register("buyer").await;

    app.add_to_cart(&token, mug.id).await;
    app.add_to_cart(&token, mug.id).await;
    app.add_to_cart(&token, plate.id).await;

    let (_, body) = app.get("/api/cart", Some(&token)).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product_id"], mug.id);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(money(&items[0]["line_total"]), dec!(20.00));
    assert_eq!(money(&body["total"]), dec!(25.00));
}

#[tokio::test]
async fn update_sets_quantity_and_non_positive_removes() {
    let app = spawn_app().await;
    let category = app.category("Ceramics").await;
    let mug = app.product(category.id, "Mug", dec!(12.50)).await;
    let token = app.register("buyer").await;
    app.add_to_cart(&token, mug.id).await;

    let path = format!("/api/cart/{}", mug.id);
    let (status, body) = app.patch(&path, Some(&token), json!({ "quantity": 4 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["quantity"], 4);

    let (_, body) = app.get("/api/cart", Some(&token)).await;
    assert_eq!(money(&body["total"]), dec!(50.00));

    let (status, body) = app.patch(&path, Some(&token), json!({ "quantity": -1 })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["item"].is_null());

    let (_, body) = app.get("/api/cart", Some(&token)).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    // Raising the quantity of a line that is gone.
    let (status, _) = app.patch(&path, Some(&token), json!({ "quantity": 2 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_missing_lines_is_a_no_op() {
    let app = spawn_app().await;
    let category = app.category("Ceramics").await;
    let mug = app.product(category.id, "Mug", dec!(9.00)).await;
    let token = app.register("buyer").await;

    // No cart yet.
    let (status, _) = app.delete(&format!("/api/cart/{}", mug.id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    app.add_to_cart(&token, mug.id).await;
    let (status, _) = app.delete("/api/cart/9999", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/api/cart/{}", mug.id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/cart", Some(&token)).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_or_hidden_products_cannot_be_added() {
    let app = spawn_app().await;
    let category = app.category("Ceramics").await;
    let vase = app.product(category.id, "Vase", dec!(30.00)).await;
    app.hide(vase.id).await;
    let token = app.register("buyer").await;

    let (status, _) = app
        .post(&format!("/api/cart/{}", vase.id), Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/api/cart/4242", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn carts_are_private_to_their_owner() {
    let app = spawn_app().await;
    let category = app.category("Ceramics").await;
    let mug = app.product(category.id, "Mug", dec!(10.00)).await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    app.add_to_cart(&alice, mug.id).await;

    let (_, body) = app.get("/api/cart", Some(&bob)).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    let (status, _) = app
        .patch(&format!("/api/cart/{}", mug.id), Some(&bob), json!({ "quantity": 3 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/cart", Some(&alice)).await;
    assert_eq!(body["items"][0]["quantity"], 1);
}
