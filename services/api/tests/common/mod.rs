#![allow(dead_code)]

use api_lib::{
    adapters::InMemoryStore,
    web::{build_router, state::AppState},
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const SEED: &str = include_str!("../../seed.json");

pub fn create_test_app_with_seed(seed: &str) -> Router {
    let store = InMemoryStore::from_json_str(seed).expect("seed parses");
    build_router(Arc::new(AppState::from_store(Arc::new(store))))
}

pub fn create_test_app() -> Router {
    create_test_app_with_seed(SEED)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
}
