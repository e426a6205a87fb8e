//! Request-level behavior of the intake API, driven through the router.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;

use common::{build_app, fixed_config, jane_doe, post_clients, send, token_config, TEST_SECRET};
use secure_intake::audit::{AuditSink, RedactedRecord, SinkError, REDACTION_PLACEHOLDER};
use secure_intake::http::build_router;
use secure_intake::intake::InMemoryRecordStore;
use secure_intake::config::IntakeConfig;
use secure_intake::security::cipher::generate_key;
use secure_intake::AppContext;
use secure_intake::security::{CallerIdentity, Claims, DecryptionError, TokenCodec};

#[tokio::test]
async fn test_case_worker_creates_record() {
    let app = build_app(&fixed_config("CaseWorker"));

    let (status, headers, body) = send(&app.router, post_clients(&jane_doe(), None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Client created");
    let record_id = body["record_id"].as_u64().unwrap();
    assert!(!body.to_string().contains("123-45-6789"));
    assert!(headers.contains_key("x-request-id"));

    let stored = app.store.get(record_id).unwrap();
    assert_eq!(stored.full_name, "Jane Doe");
    assert_eq!(stored.created_by, 7);
    assert_ne!(stored.encrypted_ssn, "123-45-6789");
    assert_eq!(app.ctx.cipher.decrypt(&stored.encrypted_ssn).unwrap(), "123-45-6789");

    let records = app.audit.records();
    assert_eq!(records.len(), 1);
    let audit = &records[0];
    assert_eq!(audit.get("path").unwrap(), "/clients");
    assert_eq!(audit.get("method").unwrap(), "POST");
    assert_eq!(audit.get("status_code").unwrap(), 201);
    assert_eq!(audit.get("ssn").unwrap(), REDACTION_PLACEHOLDER);
    assert_eq!(audit.get("record_id").unwrap().as_u64(), Some(record_id));
    assert!(!audit.to_json().unwrap().contains("123-45-6789"));
}

#[tokio::test]
async fn test_admin_is_allowed() {
    let app = build_app(&fixed_config("Admin"));
    let (status, _, _) = send(&app.router, post_clients(&jane_doe(), None)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_record_ids_are_distinct() {
    let app = build_app(&fixed_config("CaseWorker"));

    let (_, _, first) = send(&app.router, post_clients(&jane_doe(), None)).await;
    let (_, _, second) = send(&app.router, post_clients(&jane_doe(), None)).await;

    assert_ne!(first["record_id"], second["record_id"]);
    assert_eq!(app.store.len(), 2);
}

#[tokio::test]
async fn test_guest_is_forbidden() {
    let app = build_app(&fixed_config("Guest"));

    let (status, _, body) = send(&app.router, post_clients(&jane_doe(), None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "forbidden" }));
    assert!(app.store.is_empty());

    let records = app.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("status_code").unwrap(), 403);
    assert_eq!(records[0].get("caller_role").unwrap(), "Guest");
    assert!(!records[0].contains_key("ssn"));
}

#[tokio::test]
async fn test_role_match_is_exact() {
    let app = build_app(&fixed_config("caseworker"));
    let (status, _, _) = send(&app.router, post_clients(&jane_doe(), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_valid_token_creates_record() {
    let app = build_app(&token_config());
    let token = app
        .ctx
        .tokens
        .as_ref()
        .unwrap()
        .issue_default(&CallerIdentity::new(42, "CaseWorker"))
        .unwrap();

    let (status, _, body) = send(&app.router, post_clients(&jane_doe(), Some(&token))).await;

    assert_eq!(status, StatusCode::CREATED);
    let stored = app.store.get(body["record_id"].as_u64().unwrap()).unwrap();
    assert_eq!(stored.created_by, 42);
}

#[tokio::test]
async fn test_token_role_is_checked() {
    let app = build_app(&token_config());
    let token = app
        .ctx
        .tokens
        .as_ref()
        .unwrap()
        .issue_default(&CallerIdentity::new(42, "Guest"))
        .unwrap();

    let (status, _, _) = send(&app.router, post_clients(&jane_doe(), Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_credentials_unauthorized() {
    let app = build_app(&token_config());

    let (status, headers, body) = send(&app.router, post_clients(&jane_doe(), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "unauthorized" }));
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert!(app.store.is_empty());
    assert_eq!(app.audit.records()[0].get("status_code").unwrap(), 401);
}

#[tokio::test]
async fn test_expired_token_unauthorized() {
    let app = build_app(&token_config());
    let now = chrono::Utc::now().timestamp() as u64;
    let token = app
        .ctx
        .tokens
        .as_ref()
        .unwrap()
        .sign(&Claims {
            sub: "42".into(),
            role: "Admin".into(),
            iat: now - 120,
            exp: now - 60,
        })
        .unwrap();

    let (status, headers, _) = send(&app.router, post_clients(&jane_doe(), Some(&token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key(header::WWW_AUTHENTICATE));
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_foreign_secret_unauthorized() {
    let app = build_app(&token_config());
    let foreign = TokenCodec::new(
        b"some-other-secret",
        jsonwebtoken::Algorithm::HS256,
        Duration::from_secs(60),
    );
    let token = foreign
        .issue_default(&CallerIdentity::new(1, "Admin"))
        .unwrap();

    let (status, _, _) = send(&app.router, post_clients(&jane_doe(), Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_unauthorized() {
    let app = build_app(&token_config());
    let request = Request::builder()
        .method("POST")
        .uri("/clients")
        .header("content-type", "application/json")
        .header("authorization", format!("Basic {}", TEST_SECRET))
        .body(Body::from(jane_doe().to_string()))
        .unwrap();

    let (status, _, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = build_app(&fixed_config("CaseWorker"));
    let body = json!({ "full_name": "Jane Doe", "ssn": "123-45-6789" });

    let (status, _, _) = send(&app.router, post_clients(&body, None)).await;

    assert!(status.is_client_error());
    assert!(app.store.is_empty());
    assert!(!app.audit.records()[0].contains_key("ssn"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = fixed_config("CaseWorker");
    config.security.max_body_size = 64;
    let app = build_app(&config);

    let (status, _, _) = send(&app.router, post_clients(&jane_doe(), None)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_health_needs_no_credentials() {
    let app = build_app(&token_config());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, headers, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
}

#[tokio::test]
async fn test_client_request_id_is_kept() {
    let app = build_app(&fixed_config("CaseWorker"));
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-abc")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = send(&app.router, request).await;

    assert_eq!(headers.get("x-request-id").unwrap(), "req-abc");
    assert_eq!(app.audit.records()[0].get("request_id").unwrap(), "req-abc");
}

#[tokio::test]
async fn test_tampered_ciphertext_fails_closed() {
    let app = build_app(&fixed_config("CaseWorker"));
    let (_, _, body) = send(&app.router, post_clients(&jane_doe(), None)).await;
    let stored = app.store.get(body["record_id"].as_u64().unwrap()).unwrap();

    let mut tampered = stored.encrypted_ssn.into_bytes();
    let last = tampered.len() - 2;
    tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    assert_eq!(
        app.ctx.cipher.decrypt(&tampered),
        Err(DecryptionError::Authentication)
    );
}

#[tokio::test]
async fn test_configured_keys_are_redacted() {
    let mut config = fixed_config("CaseWorker");
    config.audit.redact_keys = vec!["created_by".to_string()];
    let app = build_app(&config);

    send(&app.router, post_clients(&jane_doe(), None)).await;

    let audit = &app.audit.records()[0];
    assert_eq!(audit.get("created_by").unwrap(), REDACTION_PLACEHOLDER);
    assert_eq!(audit.get("ssn").unwrap(), REDACTION_PLACEHOLDER);
    assert_ne!(audit.get("record_id").unwrap(), REDACTION_PLACEHOLDER);
}

struct UnavailableSink;

impl AuditSink for UnavailableSink {
    fn emit(&self, _record: &RedactedRecord) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("audit backend down".into()))
    }
}

#[tokio::test]
async fn test_audit_sink_failure_leaves_response_intact() {
    let config = fixed_config("CaseWorker");
    let store = Arc::new(InMemoryRecordStore::new());
    let ctx = AppContext::from_config(&config)
        .unwrap()
        .with_store(store.clone())
        .with_audit_sink(Arc::new(UnavailableSink));
    let router = build_router(&config, &ctx);

    let (status, headers, body) = send(&router, post_clients(&jane_doe(), None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Client created");
    assert_eq!(body["record_id"].as_u64(), Some(1));
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_audit_sink_failure_keeps_rejection() {
    let config = fixed_config("Guest");
    let ctx = AppContext::from_config(&config)
        .unwrap()
        .with_audit_sink(Arc::new(UnavailableSink));
    let router = build_router(&config, &ctx);

    let (status, _, body) = send(&router, post_clients(&jane_doe(), None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "forbidden" }));
}

#[tokio::test]
async fn test_default_config_requires_credentials() {
    let mut config = IntakeConfig::default();
    config.crypto.encryption_key = Some(generate_key());
    assert!(AppContext::from_config(&config).is_err());

    config.auth.signing_secret = Some(TEST_SECRET.to_string());
    let app = build_app(&config);
    let (status, _, _) = send(&app.router, post_clients(&jane_doe(), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.is_empty());
}
