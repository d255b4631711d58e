//! Integration log entries
//!
//! One entry is recorded per external lookup (tariff table, tax RPC,
//! cashback table, toll service), whether it succeeded or failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Status code recorded for a successful lookup
pub const STATUS_OK: u16 = 200;

/// Status code recorded when a lookup found nothing
pub const STATUS_NOT_FOUND: u16 = 404;

/// Status code recorded for a failed lookup
pub const STATUS_ERROR: u16 = 500;

/// Kind of call made against the external dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrationMethod {
    Select,
    Rpc,
    Post,
}

/// Append-only record of one external call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationLogEntry {
    /// Unique entry ID
    pub id: Uuid,
    /// Table, RPC or remote operation name
    pub endpoint: String,
    pub method: IntegrationMethod,
    pub request_payload: serde_json::Value,
    pub response_payload: serde_json::Value,
    pub status_code: u16,
    /// Wall time of the call, retries included
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl IntegrationLogEntry {
    /// Create an entry with empty payloads and a 200 status
    pub fn new(endpoint: impl Into<String>, method: IntegrationMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint: endpoint.into(),
            method,
            request_payload: serde_json::Value::Null,
            response_payload: serde_json::Value::Null,
            status_code: STATUS_OK,
            duration_ms: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_request(mut self, payload: serde_json::Value) -> Self {
        self.request_payload = payload;
        self
    }

    pub fn with_response(mut self, payload: serde_json::Value) -> Self {
        self.response_payload = payload;
        self
    }

    /// Record a failure: error message as the response, status 500
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.response_payload = serde_json::json!({ "error": message.into() });
        self.status_code = STATUS_ERROR;
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = elapsed.as_millis() as u64;
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let entry = IntegrationLogEntry::new("ntc_lotacao", IntegrationMethod::Select)
            .with_request(serde_json::json!({ "distance_km": 300.0 }))
            .with_response(serde_json::json!({ "price_per_ton": 85.2 }))
            .with_duration(Duration::from_millis(42));

        assert!(entry.is_success());
        assert_eq!(entry.duration_ms, 42);
        assert_eq!(entry.request_payload["distance_km"], 300.0);
    }

    #[test]
    fn test_entry_with_error() {
        let entry = IntegrationLogEntry::new("get_icms_rate", IntegrationMethod::Rpc)
            .with_error("connection reset");

        assert!(!entry.is_success());
        assert_eq!(entry.status_code, STATUS_ERROR);
        assert_eq!(entry.response_payload["error"], "connection reset");
    }

    #[test]
    fn test_method_serializes_uppercase() {
        let json = serde_json::to_string(&IntegrationMethod::Rpc).unwrap();
        assert_eq!(json, "\"RPC\"");
    }
}
