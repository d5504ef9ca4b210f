//! Last-good response cache for the live proxy routes
//!
//! Bounded and time-limited (moka). Entries are only read back when Steam
//! rate-limits us.

use moka::sync::Cache;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 100;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCacheConfig {
    pub max_capacity: u64,
    pub ttl: Duration,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Cheap to clone, clones share entries
#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<String, Value>,
}

impl ResponseCache {
    pub fn new(config: ResponseCacheConfig) -> Self {
        tracing::info!(
            ttl_seconds = config.ttl.as_secs(),
            max_capacity = config.max_capacity,
            "Response cache configured"
        );
        Self {
            entries: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.ttl)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key)
    }

    pub fn set(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(ResponseCacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_and_returns_by_key() {
        let cache = ResponseCache::default();
        assert_eq!(cache.get("/steam/user/status"), None);

        cache.set("/steam/user/status", json!({ "personaname": "gabe" }));
        cache.set("/steam/user/status", json!({ "personaname": "newell" }));

        assert_eq!(cache.get("/steam/user/status"), Some(json!({ "personaname": "newell" })));
        assert_eq!(cache.get("/steam/user/recent"), None);
    }

    #[test]
    fn entries_expire_after_ttl() {
        // moka reads std::time, not the tokio clock, so this one really sleeps
        let cache = ResponseCache::new(ResponseCacheConfig {
            max_capacity: 10,
            ttl: Duration::from_millis(50),
        });
        cache.set("key", json!(1));
        assert!(cache.get("key").is_some());

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(cache.get("key"), None);
    }
}
