//! Wire types for the intake API.

use serde::{Deserialize, Serialize};

/// Body of `POST /clients`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    pub full_name: String,
    /// Sensitive. Encrypted before persistence, redacted in audit records.
    pub ssn: String,
    pub date_of_birth: String,
    pub address: String,
}

impl std::fmt::Debug for ClientCreate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCreate")
            .field("full_name", &self.full_name)
            .field("ssn", &"[REDACTED]")
            .field("date_of_birth", &self.date_of_birth)
            .field("address", &self.address)
            .finish()
    }
}

/// Successful response of `POST /clients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordResponse {
    pub message: String,
    pub record_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_ssn() {
        let payload = ClientCreate {
            full_name: "Jane Doe".into(),
            ssn: "123-45-6789".into(),
            date_of_birth: "1990-01-01".into(),
            address: "1 Main St".into(),
        };
        let printed = format!("{:?}", payload);
        assert!(printed.contains("Jane Doe"));
        assert!(!printed.contains("123-45-6789"));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let result = serde_json::from_str::<ClientCreate>(r#"{"full_name": "Jane", "ssn": "1"}"#);
        assert!(result.is_err());
    }
}
