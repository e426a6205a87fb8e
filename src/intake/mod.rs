//! Client record intake.
//!
//! # Data Flow
//! ```text
//! POST /clients (after the access guard)
//!     → handler.rs (encrypt ssn with the FieldCipher)
//!     → store.rs (RecordStore::insert)
//!     → 201 {message, record_id} + AuditFields for the recorder
//! ```

pub mod handler;
pub mod store;
pub mod types;

pub use handler::{create_record, health, IntakeState};
pub use store::{ClientRecord, InMemoryRecordStore, NewClientRecord, RecordStore, StoreError};
pub use types::{ClientCreate, CreateRecordResponse};
