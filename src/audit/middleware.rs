//! Audit middleware.
//!
//! Wraps every route. Runs the inner service, then builds the request's
//! audit record from request metadata, the final status and any
//! [`AuditFields`] the inner layers attached, and passes it to the
//! recorder. The response is returned unchanged whatever the sink does.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::audit::record::{AuditFields, AuditRecord};
use crate::audit::recorder::AuditRecorder;
use crate::http::request::request_id;
use crate::observability::metrics;

pub async fn audit_middleware(
    State(recorder): State<AuditRecorder>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let path = request.uri().path().to_string();
    let method = request.method().to_string();
    let request_id = request_id(request.headers()).map(str::to_owned);

    let mut response = next.run(request).await;
    let status = response.status().as_u16();

    let mut record = AuditRecord::new(path, method.clone(), Utc::now(), status);
    if let Some(id) = request_id {
        record.insert("request_id", id);
    }
    if let Some(fields) = response.extensions_mut().remove::<AuditFields>() {
        record.extend(fields);
    }

    recorder.record(record);
    metrics::record_request(&method, status, start_time);

    response
}
