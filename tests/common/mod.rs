#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use reqwest::{Client, Method, StatusCode};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::{json, Value};

use handmade_store::config::Config;
use handmade_store::entities::{category, product, user};
use handmade_store::middleware::auth::generate_token;
use handmade_store::services::admin::{self, CreateCategory, CreateProduct, PatchProduct};
use handmade_store::{app, connect};

pub const PASSWORD: &str = "woolly-socks-42";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
}

/// Boots the full router on an ephemeral port backed by a fresh in-memory
/// database.
pub async fn spawn_app() -> TestApp {
    let config = Config::for_database("sqlite::memory:", "integration-test-secret");
    let db = Arc::new(
        connect(&config)
            .await
            .expect("Failed to open the test database"),
    );
    let config = Arc::new(config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind a test port");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Listener has no address")
    );

    let router = app(db.clone(), config.clone());
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server stopped");
    });

    TestApp {
        address,
        client: Client::new(),
        db,
        config,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Sends a request and returns the status with the JSON body, or `Null`
    /// when the body is not JSON.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.expect("Failed to send request");
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, token, None).await
    }

    /// Registers a shopper and returns their bearer token.
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                    "password_confirm": PASSWORD
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");

        body["token"]
            .as_str()
            .expect("Token not found in register response")
            .to_string()
    }

    /// Creates an administrator row directly and mints a token for it.
    pub async fn admin_token(&self) -> String {
        let admin = user::ActiveModel {
            username: Set(format!("admin-{}", uuid::Uuid::new_v4())),
            email: Set("admin@example.com".into()),
            password: Set("not-a-login-account".into()),
            role: Set(user::Role::Admin),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("Failed to insert admin");

        generate_token(admin.id, user::Role::Admin, &self.config).expect("Failed to mint token")
    }

    pub async fn category(&self, name: &str) -> category::Model {
        admin::create_category(
            &*self.db,
            CreateCategory {
                name: name.into(),
                slug: None,
            },
        )
        .await
        .expect("Failed to create category")
    }

    pub async fn product(&self, category_id: i32, name: &str, price: Decimal) -> product::Model {
        admin::create_product(
            &*self.db,
            CreateProduct {
                name: name.into(),
                slug: None,
                description: format!("Handmade {name}"),
                price,
                stock: 5,
                available: Some(true),
                category_id,
                image_id: None,
            },
        )
        .await
        .expect("Failed to create product")
    }

    pub async fn hide(&self, product_id: i32) {
        admin::patch_product(
            &*self.db,
            product_id,
            PatchProduct {
                available: Some(false),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to hide product");
    }

    pub async fn add_to_cart(&self, token: &str, product_id: i32) {
        let (status, body) = self
            .post(&format!("/api/cart/{product_id}"), Some(token), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK, "add to cart failed: {body}");
    }
}

pub fn money(value: &Value) -> Decimal {
    let raw = value.as_str().expect("Money should serialize as a string");
    Decimal::from_str(raw).expect("Money should parse as a decimal")
}

pub fn contact() -> Value {
    json!({
        "full_name": "Ada Weaver",
        "email": "ada@example.com",
        "phone": "+1 555 0100",
        "address": "12 Loom Lane, Spindle Town"
    })
}
