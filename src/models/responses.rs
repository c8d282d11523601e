//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheLookup;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Option<String>,
    /// Whether a live value was found
    pub found: bool,
}

impl From<CacheLookup> for GetResponse {
    fn from(lookup: CacheLookup) -> Self {
        Self {
            found: lookup.found(),
            key: lookup.key,
            value: lookup.value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the EXISTS operation (GET /exists/:key)
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// The key that was targeted
    pub key: String,
    /// Whether an entry was actually removed
    pub removed: bool,
}

/// Response body for the COUNT operation (GET /count)
#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    /// Approximate number of live entries across all shards
    pub count: usize,
    /// Number of shards
    pub shards: usize,
}

/// Response body for the DUMP operation (GET /dump)
#[derive(Debug, Clone, Serialize)]
pub struct DumpResponse {
    pub entries: HashMap<String, String>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current time, serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_from_hit() {
        let resp = GetResponse::from(CacheLookup {
            key: "test_key".to_string(),
            value: Some("test_value".to_string()),
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "test_key");
        assert_eq!(json["value"], "test_value");
        assert_eq!(json["found"], true);
    }

    #[test]
    fn test_get_response_from_miss() {
        let resp = GetResponse::from(CacheLookup {
            key: "gone".to_string(),
            value: None,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["found"], false);
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "healthy");

        let timestamp = json["timestamp"].as_str().unwrap();
        assert_eq!(
            DateTime::parse_from_rfc3339(timestamp).unwrap(),
            resp.timestamp
        );
    }
}
