//! Handler tests for Products domain
//!
//! These tests drive the products router over HTTP:
//! - Request deserialization (JSON → Rust structs)
//! - Response serialization (Rust structs → JSON)
//! - HTTP status codes
//! - Error responses
//!
//! Storage is an in-memory `ProductRepository`, so no database is needed.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_products::*;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

/// Vec-backed repository that counts writes
#[derive(Clone, Default)]
struct InMemoryRepository {
    products: Arc<Mutex<Vec<Product>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryRepository {
    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let product = Product::new(input);
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.lock().unwrap();
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| filter.matches(p.price))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ProductError::NotFound(id))?;
        product.apply_update(input);
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

fn app(repo: InMemoryRepository) -> Router {
    Router::new().nest("/products", handlers::router(ProductService::new(repo)))
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create(app: &Router, name: &str, price: &str) -> Product {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": name, "quantity": 10, "price": price, "status": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_create_product_handler_returns_201() {
    let app = app(InMemoryRepository::default());
    let builder = TestDataBuilder::from_test_name("handler_create_201");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({
                "name": builder.name("product", "main"),
                "quantity": builder.quantity(),
                "price": builder.price().to_string(),
                "status": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["name"], builder.name("product", "main"));
    assert_eq!(body["quantity"], builder.quantity());
    assert_eq!(body["price"], builder.price().to_string());
    assert_eq!(body["status"], true);
    assert_eq!(body["created_at"], body["updated_at"]);
    assert!(body.get("_id").is_none());

    let id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();
    assert_eq!(id.get_version_num(), 7);
}

#[tokio::test]
async fn test_create_product_generates_fresh_ids() {
    let app = app(InMemoryRepository::default());

    let first = create(&app, "first", "1.00").await;
    let second = create(&app, "second", "1.00").await;

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_create_product_accepts_numeric_price() {
    let app = app(InMemoryRepository::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": "numeric", "quantity": 1, "price": 8.5, "status": false }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.price, dec("8.5"));
}

#[tokio::test]
async fn test_create_product_handler_validates_input() {
    let repo = InMemoryRepository::default();
    let app = app(repo.clone());

    for body in [
        json!({ "name": "", "quantity": 1, "price": "1.00", "status": true }),
        json!({ "name": "ok", "quantity": -1, "price": "1.00", "status": true }),
        json!({ "name": "ok", "quantity": 1, "price": "-1.00", "status": true }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/products", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: Value = json_body(response.into_body()).await;
        assert_eq!(error["error"], "VALIDATION_ERROR");
    }

    assert_eq!(repo.writes(), 0);
}

#[tokio::test]
async fn test_create_product_rejects_malformed_body() {
    let app = app(InMemoryRepository::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": "missing fields" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let error: Value = json_body(response.into_body()).await;
    assert_eq!(error["error"], "JSON_EXTRACTION");
}

#[tokio::test]
async fn test_get_product_handler_returns_product() {
    let app = app(InMemoryRepository::default());
    let created = create(&app, "lookup", "12.30").await;

    let response = app
        .oneshot(empty_request("GET", &format!("/products/{}", created.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product, created);
}

#[tokio::test]
async fn test_get_product_handler_returns_404() {
    let app = app(InMemoryRepository::default());
    let id = Uuid::now_v7();

    let response = app
        .oneshot(empty_request("GET", &format!("/products/{}", id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error: Value = json_body(response.into_body()).await;
    assert_eq!(error["error"], "NOT_FOUND");
    assert_eq!(
        error["message"],
        format!("Product not found with filter: {}", id)
    );
}

#[tokio::test]
async fn test_get_product_handler_rejects_malformed_id() {
    let app = app(InMemoryRepository::default());

    let response = app
        .oneshot(empty_request("GET", "/products/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = json_body(response.into_body()).await;
    assert_eq!(error["error"], "INVALID_UUID");
}

#[tokio::test]
async fn test_list_products_handler_filters_by_price() {
    let app = app(InMemoryRepository::default());
    let cheap = create(&app, "cheap", "5.00").await;
    let edge_low = create(&app, "edge-low", "10.00").await;
    let mid = create(&app, "mid", "25.00").await;
    let edge_high = create(&app, "edge-high", "50.00").await;
    let pricey = create(&app, "pricey", "99.00").await;

    let ids = |products: Vec<Product>| products.into_iter().map(|p| p.id).collect::<Vec<_>>();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let all: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(
        ids(all),
        vec![cheap.id, edge_low.id, mid.id, edge_high.id, pricey.id]
    );

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/products?price_min=10"))
        .await
        .unwrap();
    let above: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(ids(above), vec![mid.id, edge_high.id, pricey.id]);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/products?price_max=50"))
        .await
        .unwrap();
    let below: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(ids(below), vec![cheap.id, edge_low.id, mid.id]);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/products?price_min=10&price_max=50"))
        .await
        .unwrap();
    let between: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(ids(between), vec![mid.id]);
}

#[tokio::test]
async fn test_update_product_handler_changes_only_given_fields() {
    let repo = InMemoryRepository::default();
    let app = app(repo.clone());
    let created = create(&app, "patch-me", "8.50").await;

    // Timestamps are kept at millisecond precision
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/products/{}", created.id),
            json!({ "quantity": 3, "price": null }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated: Product = json_body(response.into_body()).await;

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.quantity, 3);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.price, created.price);
    assert_eq!(updated.status, created.status);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(repo.writes(), 2);
}

#[tokio::test]
async fn test_update_product_handler_returns_404() {
    let repo = InMemoryRepository::default();
    let app = app(repo.clone());

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/products/{}", Uuid::now_v7()),
            json!({ "status": false }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(repo.writes(), 0);
}

#[tokio::test]
async fn test_update_product_handler_validates_input() {
    let app = app(InMemoryRepository::default());
    let created = create(&app, "valid", "1.00").await;

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/products/{}", created.id),
            json!({ "name": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_product_handler_returns_204() {
    let app = app(InMemoryRepository::default());
    let created = create(&app, "short-lived", "1.00").await;
    let uri = format!("/products/{}", created.id);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product_handler_returns_404_without_write() {
    let repo = InMemoryRepository::default();
    let app = app(repo.clone());

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/products/{}", Uuid::now_v7()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(repo.writes(), 0);
}
