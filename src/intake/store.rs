//! Record persistence boundary.
//!
//! The service only ever writes; the in-memory store exposes reads for
//! tests and operators.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What gets persisted. `encrypted_ssn` is a field token, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: u64,
    pub full_name: String,
    pub encrypted_ssn: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Input to [`RecordStore::insert`]; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewClientRecord {
    pub full_name: String,
    pub encrypted_ssn: String,
    pub created_by: i64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for client records.
pub trait RecordStore: Send + Sync {
    fn insert(&self, record: NewClientRecord) -> Result<ClientRecord, StoreError>;
}

/// Process-local store backed by a concurrent map.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: DashMap<u64, ClientRecord>,
    next_id: AtomicU64,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn get(&self, id: u64) -> Option<ClientRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, record: NewClientRecord) -> Result<ClientRecord, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = ClientRecord {
            id,
            full_name: record.full_name,
            encrypted_ssn: record.encrypted_ssn,
            created_by: record.created_by,
            created_at: Utc::now(),
        };
        self.records.insert(id, stored.clone());
        Ok(stored)
    }
}
