//! Typed views over firewall API responses.
//!
//! [`FirewallClient`](crate::FirewallClient) returns raw JSON. These types
//! let callers decode the common response shapes when they want to.

use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page of rows returned by a `search*` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct SearchResult<T = Value> {
    /// Returned rows.
    #[serde(default)]
    pub rows: Vec<T>,
    /// Number of rows in this page.
    #[serde(rename = "rowCount", default)]
    pub row_count: i64,
    /// Total number of matching rows.
    #[serde(default)]
    pub total: i64,
    /// Current page number.
    #[serde(default)]
    pub current: i64,
}

impl<T: DeserializeOwned> SearchResult<T> {
    /// Decode a search response.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the value does not have the search shape.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Outcome of an add/set/delete/toggle call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationResult {
    /// `saved`, `deleted`, `failed`, or for toggles `Enabled`/`Disabled`.
    pub result: String,
    /// UUID assigned to a newly created item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Per-field validation messages on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<Map<String, Value>>,
    /// Whether a toggle changed anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

impl MutationResult {
    /// Decode a mutation response.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the value has no `result` field.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// True when the appliance stored the record.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.result == "saved"
    }

    /// True when the appliance removed the record.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.result == "deleted"
    }

    /// True when the appliance reported validation failures.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.result == "failed"
    }
}

/// Outcome of an apply/reconfigure call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyStatus {
    /// Status text, usually `OK` with a trailing newline.
    pub status: String,
}

impl ApplyStatus {
    /// Decode an apply response.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the value has no `status` field.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// True when the status reads `ok`, ignoring case and whitespace.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opnsense_core::Error;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Category {
        uuid: String,
        name: String,
    }

    #[test]
    fn search_result_decodes_typed_rows() {
        let result: SearchResult<Category> = SearchResult::from_value(json!({
            "rows": [{"uuid": "c1", "name": "dmz"}],
            "rowCount": 1,
            "total": 1,
            "current": 1
        }))
        .unwrap();

        assert_eq!(result.total, 1);
        assert_eq!(
            result.rows,
            vec![Category {
                uuid: "c1".to_string(),
                name: "dmz".to_string()
            }]
        );
    }

    #[test]
    fn search_result_defaults_missing_counters() {
        let result: SearchResult = SearchResult::from_value(json!({"rows": []})).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.row_count, 0);
    }

    #[test]
    fn mutation_result_saved_with_uuid() {
        let result = MutationResult::from_value(json!({
            "result": "saved",
            "uuid": "2f5d1a2e-4db4-4c6f-9b8e-0c3f0e9a1b7d"
        }))
        .unwrap();

        assert!(result.is_saved());
        assert!(!result.is_failed());
        assert_eq!(
            result.uuid.as_deref(),
            Some("2f5d1a2e-4db4-4c6f-9b8e-0c3f0e9a1b7d")
        );
    }

    #[test]
    fn mutation_result_failed_validations() {
        let result = MutationResult::from_value(json!({
            "result": "failed",
            "validations": {"alias.name": "An alias with this name already exists."}
        }))
        .unwrap();

        assert!(result.is_failed());
        let validations = result.validations.unwrap();
        assert!(validations.contains_key("alias.name"));
    }

    #[test]
    fn mutation_result_toggle() {
        let result =
            MutationResult::from_value(json!({"result": "Disabled", "changed": true})).unwrap();
        assert_eq!(result.changed, Some(true));
        assert!(!result.is_deleted());
    }

    #[test]
    fn mutation_result_requires_result_field() {
        let err = MutationResult::from_value(json!({"status": "ok"})).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn apply_status_ok_with_newline() {
        let status = ApplyStatus::from_value(json!({"status": "OK\n"})).unwrap();
        assert!(status.is_ok());

        let status = ApplyStatus::from_value(json!({"status": "failed"})).unwrap();
        assert!(!status.is_ok());
    }
}
