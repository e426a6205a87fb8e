//! Full stack over a real socket, driven by the Rust SDK.

mod common;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::net::TcpListener;

use common::token_config;
use intake_sdk::{ClientPayload, IntakeClient};
use secure_intake::audit::{MemorySink, REDACTION_PLACEHOLDER};
use secure_intake::intake::InMemoryRecordStore;
use secure_intake::security::CallerIdentity;
use secure_intake::{AppContext, IntakeServer, Shutdown};

fn payload() -> ClientPayload {
    ClientPayload {
        full_name: "Jane Doe".into(),
        ssn: "123-45-6789".into(),
        date_of_birth: "1990-01-01".into(),
        address: "123 Main St".into(),
    }
}

#[tokio::test]
async fn test_sdk_round_trip_over_tcp() {
    let config = token_config();
    let store = Arc::new(InMemoryRecordStore::new());
    let audit = Arc::new(MemorySink::new());
    let ctx = AppContext::from_config(&config)
        .unwrap()
        .with_store(store.clone())
        .with_audit_sink(audit.clone());
    let codec = ctx.tokens.clone().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = IntakeServer::new(config, &ctx);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = IntakeClient::new(&format!("http://{}", addr));

    let health = client.health().await.unwrap();
    assert_eq!(health.status, StatusCode::OK);
    assert!(health.request_id.is_some());

    let anonymous = client.create_record(None, &payload()).await.unwrap();
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error(), Some("unauthorized"));

    let guest = codec
        .issue_default(&CallerIdentity::new(3, "Guest"))
        .unwrap();
    let forbidden = client.create_record(Some(&guest), &payload()).await.unwrap();
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.error(), Some("forbidden"));

    let worker = codec
        .issue_default(&CallerIdentity::new(11, "CaseWorker"))
        .unwrap();
    let created = client.create_record(Some(&worker), &payload()).await.unwrap();
    let created = created.created().unwrap();
    assert_eq!(created.message, "Client created");

    let stored = store.get(created.record_id).unwrap();
    assert_eq!(stored.created_by, 11);
    assert_eq!(ctx.cipher.decrypt(&stored.encrypted_ssn).unwrap(), "123-45-6789");

    let records = audit.records();
    assert_eq!(records.len(), 4);
    for record in &records {
        assert!(!record.to_json().unwrap().contains("123-45-6789"));
    }
    assert_eq!(records[3].get("ssn").unwrap(), REDACTION_PLACEHOLDER);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}
