//! Audit subsystem.
//!
//! # Data Flow
//! ```text
//! response leaves the handler
//!     → middleware.rs (build AuditRecord: path, method, timestamp, status + AuditFields)
//!     → recorder.rs (redact.rs replaces deny-listed values)
//!     → sink.rs (tracing / stdout / memory)
//! ```
//!
//! # Design Decisions
//! - Sinks only accept `RedactedRecord`, which only `redact` can build
//! - Keys are never removed, only their values replaced
//! - Sink failures are logged and dropped, never turned into request failures

pub mod middleware;
pub mod record;
pub mod recorder;
pub mod redact;
pub mod sink;

pub use middleware::audit_middleware;
pub use record::{AuditFields, AuditRecord};
pub use recorder::AuditRecorder;
pub use redact::{redact, DenyList, RedactedRecord, REDACTION_PLACEHOLDER};
pub use sink::{sink_for, AuditSink, MemorySink, SinkError, StdoutSink, TracingSink};
