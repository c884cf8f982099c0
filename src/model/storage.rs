use serde::{Deserialize, Serialize};
use serde_json::Value;

// Storage model

/// What the TTL cache keeps under each key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    /// Epoch milliseconds at the time of the write.
    pub timestamp: i64,
}
