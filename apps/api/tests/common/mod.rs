//! Shared harness for API integration tests.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use veta_api::{router, AppState};
use veta_db::{Database, DbConfig};

/// A router backed by a fresh in-memory database.
pub struct TestApp {
    pub router: Router,
}

/// Status, headers and raw body of one response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers.get(name).unwrap().to_str().unwrap()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        TestApp {
            router: router(AppState::new(db)),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&value).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// Creates a material and one of its products, returning their ids.
    pub async fn seed_catalog(&self, material: &str, product: &str, unit: &str) -> (i64, i64) {
        let response = self
            .post("/api/materials", serde_json::json!({ "name": material }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        let material_id = response.json()["id"].as_i64().unwrap();

        let response = self
            .post(
                "/api/products",
                serde_json::json!({ "material_id": material_id, "name": product, "unit": unit }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        let product_id = response.json()["id"].as_i64().unwrap();

        (material_id, product_id)
    }
}
