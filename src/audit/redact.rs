//! Redaction of deny-listed audit keys.
//!
//! Sinks accept only [`RedactedRecord`], and the only way to build one is
//! [`redact`], so nothing reaches a sink without passing through here.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::audit::record::AuditRecord;

/// Replacement written over every deny-listed value.
pub const REDACTION_PLACEHOLDER: &str = "***REDACTED***";

/// Key that is always on the deny-list.
pub const ALWAYS_REDACTED: &str = "ssn";

/// Set of keys whose values must never be emitted. Matching ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyList(BTreeSet<String>);

impl DenyList {
    /// Build a deny-list; `ssn` is always included.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        set.insert(ALWAYS_REDACTED.to_string());
        Self(set)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(&key.to_ascii_lowercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for DenyList {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

/// An audit record whose deny-listed values have been replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RedactedRecord(AuditRecord);

impl RedactedRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_record(&self) -> &AuditRecord {
        &self.0
    }

    pub fn into_record(self) -> AuditRecord {
        self.0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

/// Replace the value at every deny-listed key with [`REDACTION_PLACEHOLDER`].
///
/// Keys are kept so consumers can see that a sensitive field was present.
/// Nested objects and arrays are walked too. Idempotent.
pub fn redact(record: &AuditRecord, deny_list: &DenyList) -> RedactedRecord {
    let mut redacted = record.clone();
    redact_map(redacted.as_map_mut(), deny_list);
    RedactedRecord(redacted)
}

fn redact_map(map: &mut Map<String, Value>, deny_list: &DenyList) {
    for (key, value) in map.iter_mut() {
        if deny_list.contains(key) {
            *value = Value::String(REDACTION_PLACEHOLDER.to_string());
        } else {
            redact_value(value, deny_list);
        }
    }
}

fn redact_value(value: &mut Value, deny_list: &DenyList) {
    match value {
        Value::Object(map) => redact_map(map, deny_list),
        Value::Array(items) => items.iter_mut().for_each(|v| redact_value(v, deny_list)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record_with_ssn() -> AuditRecord {
        AuditRecord::new("/clients", "POST", Utc::now(), 201)
            .with_field("ssn", "123-45-6789")
            .with_field("record_id", 1)
    }

    #[test]
    fn test_ssn_always_denied() {
        let deny = DenyList::new(["date_of_birth"]);
        assert!(deny.contains("ssn"));
        assert!(deny.contains("SSN"));
        assert!(deny.contains("date_of_birth"));
        assert!(!deny.contains("full_name"));
        assert_eq!(DenyList::default().keys().collect::<Vec<_>>(), vec!["ssn"]);
    }

    #[test]
    fn test_redacts_value_and_keeps_key() {
        let record = record_with_ssn();
        let redacted = redact(&record, &DenyList::default());

        assert_eq!(redacted.get("ssn"), Some(&json!(REDACTION_PLACEHOLDER)));
        assert_eq!(redacted.get("record_id"), record.get("record_id"));
        assert_eq!(redacted.get("path"), record.get("path"));
        assert_eq!(redacted.get("timestamp"), record.get("timestamp"));
        assert!(!redacted.to_json().unwrap().contains("123-45-6789"));
    }

    #[test]
    fn test_record_without_sensitive_keys_is_unchanged() {
        let record = AuditRecord::new("/health", "GET", Utc::now(), 200);
        assert_eq!(redact(&record, &DenyList::default()).as_record(), &record);
    }

    #[test]
    fn test_redacts_nested_values() {
        let mut fields = Map::new();
        fields.insert(
            "payload".into(),
            json!({"full_name": "Jane", "SSN": "123-45-6789", "dependents": [{"ssn": "987-65-4321"}]}),
        );
        let redacted = redact(&AuditRecord::from_map(fields), &DenyList::default());
        let json = redacted.to_json().unwrap();

        assert!(!json.contains("123-45-6789"));
        assert!(!json.contains("987-65-4321"));
        assert!(json.contains("Jane"));
    }

    #[test]
    fn test_redaction_is_idempotent() {
        let deny = DenyList::default();
        let once = redact(&record_with_ssn(), &deny);
        let twice = redact(&once.clone().into_record(), &deny);
        assert_eq!(once, twice);
    }
}
