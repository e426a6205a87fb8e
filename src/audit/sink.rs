//! Audit emission targets.

use std::io::Write;
use std::sync::Mutex;

use thiserror::Error;

use crate::audit::redact::RedactedRecord;
use crate::config::AuditSinkKind;

/// Emitting a record failed. Never surfaced to the client.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to serialize audit record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write audit record: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for redacted audit records.
///
/// `emit` runs inline in the audit middleware, on the request's task.
pub trait AuditSink: Send + Sync {
    fn emit(&self, record: &RedactedRecord) -> Result<(), SinkError>;
}

/// Emits each record as a structured `tracing` event on the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn emit(&self, record: &RedactedRecord) -> Result<(), SinkError> {
        let json = record.to_json()?;
        tracing::info!(target: "audit", record = %json, "audit");
        Ok(())
    }
}

/// Writes one JSON line per record to stdout.
///
/// The write is a blocking stdout lock taken on the runtime thread. Fine for
/// line-buffered local output; use `TracingSink` with a non-blocking writer
/// when stdout may stall.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl AuditSink for StdoutSink {
    fn emit(&self, record: &RedactedRecord) -> Result<(), SinkError> {
        let json = record.to_json()?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", json)?;
        Ok(())
    }
}

/// Keeps records in memory. Used by tests and by embedders that ship
/// records elsewhere themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<RedactedRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<RedactedRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn emit(&self, record: &RedactedRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".into()))?
            .push(record.clone());
        Ok(())
    }
}

/// Build the configured sink.
pub fn sink_for(kind: AuditSinkKind) -> Box<dyn AuditSink> {
    match kind {
        AuditSinkKind::Tracing => Box::new(TracingSink),
        AuditSinkKind::Stdout => Box::new(StdoutSink),
    }
}
