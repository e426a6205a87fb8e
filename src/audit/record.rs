//! Audit record shape.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys written by the audit middleware. Extra fields never overwrite them.
pub const RESERVED_KEYS: [&str; 4] = ["path", "method", "timestamp", "status_code"];

/// One structured record per request.
///
/// Always carries `path`, `method`, `timestamp` (RFC 3339, UTC) and
/// `status_code`, plus whatever extra key/value pairs the request attached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditRecord(Map<String, Value>);

impl AuditRecord {
    pub fn new(
        path: impl Into<String>,
        method: impl Into<String>,
        timestamp: DateTime<Utc>,
        status_code: u16,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("path".into(), Value::String(path.into()));
        fields.insert("method".into(), Value::String(method.into()));
        fields.insert(
            "timestamp".into(),
            Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        fields.insert("status_code".into(), Value::from(status_code));
        Self(fields)
    }

    /// Wrap an arbitrary mapping.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add an extra field. Reserved keys are left untouched.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            tracing::debug!(key = %key, "Ignoring attempt to overwrite reserved audit key");
            return;
        }
        self.0.insert(key, value.into());
    }

    /// Merge fields attached to a response.
    pub fn extend(&mut self, fields: AuditFields) {
        for (key, value) in fields.0 {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }
}

/// Extra audit fields a handler or middleware attaches to its response.
///
/// The audit middleware removes this extension and merges it into the
/// request's [`AuditRecord`] before redaction.
#[derive(Debug, Clone, Default)]
pub struct AuditFields(Vec<(String, Value)>);

impl AuditFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_core_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let record = AuditRecord::new("/clients", "POST", ts, 201);

        assert_eq!(record.get("path"), Some(&Value::from("/clients")));
        assert_eq!(record.get("method"), Some(&Value::from("POST")));
        assert_eq!(
            record.get("timestamp"),
            Some(&Value::from("2024-05-01T12:30:00.000000Z"))
        );
        assert_eq!(record.get("status_code"), Some(&Value::from(201)));
    }

    #[test]
    fn test_extra_fields_cannot_overwrite_reserved() {
        let mut record = AuditRecord::new("/clients", "POST", Utc::now(), 403);
        record.extend(
            AuditFields::new()
                .with("status_code", 200)
                .with("path", "/elsewhere")
                .with("record_id", 5),
        );

        assert_eq!(record.get("status_code"), Some(&Value::from(403)));
        assert_eq!(record.get("path"), Some(&Value::from("/clients")));
        assert_eq!(record.get("record_id"), Some(&Value::from(5)));
    }

    #[test]
    fn test_serializes_flat() {
        let record = AuditRecord::new("/health", "GET", Utc::now(), 200).with_field("request_id", "abc");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["request_id"], "abc");
        assert_eq!(json["status_code"], 200);
    }
}
