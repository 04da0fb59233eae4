//! In-memory attribute store.

use crate::error::Result;
use crate::AttributeStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

type AttrKey = (String, String, String);

/// In-memory backend, shared between sessions in tests and simulation.
///
/// Cloning yields a handle to the same underlying map, which is exactly how
/// the shared world store behaves for co-located sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<AttrKey, Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored attributes.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no attributes.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AttributeStore for MemoryStore {
    async fn get(&self, owner: &str, namespace: &str, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(owner.to_string(), namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, owner: &str, namespace: &str, key: &str, value: Value) -> Result<()> {
        trace!(owner, namespace, key, "attribute write");
        let mut entries = self.entries.write().await;
        entries.insert(
            (owner.to_string(), namespace.to_string(), key.to_string()),
            value,
        );
        Ok(())
    }
}
