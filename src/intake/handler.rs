//! `createRecord`: the one business operation.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::audit::AuditFields;
use crate::error::IntakeError;
use crate::intake::store::{NewClientRecord, RecordStore};
use crate::intake::types::{ClientCreate, CreateRecordResponse};
use crate::observability::metrics;
use crate::security::{CallerIdentity, FieldCipher};

/// Dependencies of the intake handlers.
#[derive(Clone)]
pub struct IntakeState {
    pub cipher: Arc<FieldCipher>,
    pub store: Arc<dyn RecordStore>,
}

/// Encrypt the sensitive field, persist, answer with the new id.
///
/// Only reachable behind the access guard, which supplies the caller.
pub async fn create_record(
    State(state): State<IntakeState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<ClientCreate>,
) -> Result<Response, IntakeError> {
    let encrypted_ssn = state.cipher.encrypt(&payload.ssn)?;

    let record = state.store.insert(NewClientRecord {
        full_name: payload.full_name,
        encrypted_ssn,
        created_by: caller.id,
    })?;

    metrics::record_created();
    tracing::info!(record_id = record.id, created_by = caller.id, "Client record created");

    let body = CreateRecordResponse {
        message: "Client created".to_string(),
        record_id: record.id,
    };
    let mut response = (StatusCode::CREATED, Json(body)).into_response();

    // The recorder redacts `ssn`; the key stays so the audit trail shows it was submitted.
    response.extensions_mut().insert(
        AuditFields::new()
            .with("record_id", record.id)
            .with("created_by", caller.id)
            .with("ssn", payload.ssn),
    );

    Ok(response)
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
