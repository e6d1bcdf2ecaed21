// Role-scoped server-data cache. Cleared wholesale on logout so data
// fetched for one identity never shows under the next session.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub value: Value,
    pub fetched_at: DateTime<Utc>,
}

/// Cache of server-fetched payloads (profile, branch/semester/classroom
/// listings) keyed by request identity. Payloads are opaque JSON here;
/// typed decoding stays with the callers that fetched them.
#[derive(Debug, Clone, Default)]
pub struct DataCache {
    entries: Arc<RwLock<HashMap<String, CachedEntry>>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, key: impl Into<String>, value: Value) {
        let entry = CachedEntry {
            value,
            fetched_at: Utc::now(),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).map(|e| e.value.clone())
    }

    /// Drop one key, e.g. when an earlier cascade level changes.
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Drop everything. Called on logout before the logout request is even
    /// sent, so the next session starts from an empty cache.
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "cache invalidated");
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
