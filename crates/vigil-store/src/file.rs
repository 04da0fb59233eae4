//! JSON-file-backed attribute store.
//!
//! Used for client-local durable state (window position, visibility
//! preference). The whole map is rewritten on every set; the data involved
//! is a handful of small records, never the shared combat state.

use crate::error::Result;
use crate::AttributeStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

type AttrKey = (String, String, String);

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    owner: String,
    namespace: String,
    key: String,
    value: Value,
}

/// File-backed store holding a flat list of attribute entries.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<AttrKey, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty one if the file is absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read(&path)?;
            let list: Vec<FileEntry> = serde_json::from_slice(&raw)?;
            list.into_iter()
                .map(|e| ((e.owner, e.namespace, e.key), e.value))
                .collect()
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), "opened attribute file store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<AttrKey, Value>) -> Result<()> {
        let list: Vec<FileEntry> = entries
            .iter()
            .map(|((owner, namespace, key), value)| FileEntry {
                owner: owner.clone(),
                namespace: namespace.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        let raw = serde_json::to_vec_pretty(&list)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[async_trait]
impl AttributeStore for JsonFileStore {
    async fn get(&self, owner: &str, namespace: &str, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(owner.to_string(), namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, owner: &str, namespace: &str, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            (owner.to_string(), namespace.to_string(), key.to_string()),
            value,
        );
        self.flush(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store
                .set("session-1", "client", "position", json!({"left": 40, "top": 80}))
                .await
                .unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        let value = store.get("session-1", "client", "position").await.unwrap();
        assert_eq!(value, Some(json!({"left": 40, "top": 80})));
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.get("x", "y", "z").await.unwrap().is_none());
    }
}
