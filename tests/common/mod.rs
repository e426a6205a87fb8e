//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use secure_intake::audit::MemorySink;
use secure_intake::config::{IntakeConfig, ResolverKind};
use secure_intake::http::build_router;
use secure_intake::intake::InMemoryRecordStore;
use secure_intake::security::cipher::generate_key;
use secure_intake::AppContext;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A running application with handles on its store and audit sink.
pub struct TestApp {
    pub router: Router,
    pub ctx: AppContext,
    pub store: Arc<InMemoryRecordStore>,
    pub audit: Arc<MemorySink>,
}

/// Config using the fixed resolver with the given role.
pub fn fixed_config(role: &str) -> IntakeConfig {
    let mut config = IntakeConfig::default();
    config.crypto.encryption_key = Some(generate_key());
    config.auth.resolver = ResolverKind::Fixed;
    config.auth.fixed_identity.id = 7;
    config.auth.fixed_identity.role = role.to_string();
    config
}

/// Config using bearer tokens signed with [`TEST_SECRET`].
pub fn token_config() -> IntakeConfig {
    let mut config = IntakeConfig::default();
    config.crypto.encryption_key = Some(generate_key());
    config.auth.resolver = ResolverKind::Token;
    config.auth.signing_secret = Some(TEST_SECRET.to_string());
    config
}

pub fn build_app(config: &IntakeConfig) -> TestApp {
    let store = Arc::new(InMemoryRecordStore::new());
    let audit = Arc::new(MemorySink::new());
    let ctx = AppContext::from_config(config)
        .unwrap()
        .with_store(store.clone())
        .with_audit_sink(audit.clone());
    let router = build_router(config, &ctx);

    TestApp {
        router,
        ctx,
        store,
        audit,
    }
}

pub fn jane_doe() -> Value {
    json!({
        "full_name": "Jane Doe",
        "ssn": "123-45-6789",
        "date_of_birth": "1990-01-01",
        "address": "123 Main St",
    })
}

pub fn post_clients(body: &Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/clients")
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Send one request through the router; returns status, headers and body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}
