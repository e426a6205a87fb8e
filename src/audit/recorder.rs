//! The audit recorder: redact, then emit.

use std::sync::Arc;

use crate::audit::record::AuditRecord;
use crate::audit::redact::{redact, DenyList};
use crate::audit::sink::AuditSink;
use crate::observability::metrics;

/// Redacts and emits one record per request.
///
/// Emission is best-effort: a failing sink is logged and counted, and the
/// record is dropped.
#[derive(Clone)]
pub struct AuditRecorder {
    deny_list: Arc<DenyList>,
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(deny_list: DenyList, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            deny_list: Arc::new(deny_list),
            sink,
        }
    }

    pub fn deny_list(&self) -> &DenyList {
        &self.deny_list
    }

    /// Redact `record` and hand it to the sink.
    pub fn record(&self, record: AuditRecord) {
        let redacted = redact(&record, &self.deny_list);
        if let Err(e) = self.sink.emit(&redacted) {
            tracing::warn!(error = %e, "Audit emission failed, record dropped");
            metrics::record_audit_failure();
        }
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("deny_list", &self.deny_list)
            .finish_non_exhaustive()
    }
}
