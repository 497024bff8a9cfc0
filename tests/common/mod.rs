#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use cabinetry_backend::app::app::App;
use cabinetry_backend::config::{AdminUserConfig, AppConfig, JwtConfig};
use cabinetry_backend::repository::Repositories;
use cabinetry_backend::util::session::InMemorySessionStore;
use serde_json::{json, Value};
use tower::ServiceExt; // for .oneshot()

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin12345";

/// A fully wired router over the in-memory store with one seeded admin.
pub async fn test_router() -> Router {
    let app = App::with_backends(
        AppConfig::default(),
        Repositories::in_memory(),
        Arc::new(InMemorySessionStore::new()),
        JwtConfig::default(),
    );
    let admin = AdminUserConfig {
        username: ADMIN_USERNAME.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Admin".to_string(),
        email: "admin@workshop.test".to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };
    assert!(app.seed_admin(&admin).await.unwrap());
    app.router()
}

pub async fn send(router: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(router: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, Some(token), None).await
}

pub async fn post(router: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put(router: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(router: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(router, Method::DELETE, uri, Some(token), None).await
}

pub async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn admin_token(router: &Router) -> String {
    login(router, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

/// Creates a user with the given role and returns its id.
pub async fn create_staff(router: &Router, token: &str, username: &str, role: &str) -> String {
    let (status, body) = post(
        router,
        "/api/users",
        token,
        json!({
            "username": username,
            "email": format!("{}@workshop.test", username),
            "password": "Sawdust123",
            "first_name": username,
            "last_name": "Smith",
            "role": role,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

pub async fn create_client(router: &Router, token: &str, name: &str) -> String {
    let (status, body) = post(router, "/api/clients", token, json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED, "client creation failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

pub async fn create_job(router: &Router, token: &str, body: Value) -> Value {
    let (status, job) = post(router, "/api/jobs", token, body).await;
    assert_eq!(status, StatusCode::CREATED, "job creation failed: {}", job);
    job
}

/// Payment of the given type from a job view.
pub fn payment<'a>(job: &'a Value, kind: &str) -> Option<&'a Value> {
    job["payments"].as_array()?.iter().find(|p| p["type"] == kind)
}
