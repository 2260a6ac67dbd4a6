//! TTL cache for slow-changing API responses (layout catalogs).

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Cache key for the member layout catalog.
pub const MEMBER_LAYOUTS_KEY: &str = "member_layouts";
/// Cache key for the sheet layout catalog.
pub const SHEET_LAYOUTS_KEY: &str = "sheet_layouts";

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

/// JSON values keyed by string, each with its own expiry.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value if it has not expired. Expired entries are evicted.
    pub async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if Instant::now() < entry.expires_at => {
                    debug!("Cache hit: {}", key);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        } // read lock dropped here

        debug!("Cache entry expired: {}", key);
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| Instant::now() >= entry.expires_at)
        {
            entries.remove(key);
        }
        None
    }

    pub async fn put(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
