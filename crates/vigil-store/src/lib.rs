//! Persisted attribute store for Vigil.
//!
//! Every piece of shared tracker state - readiness records, the display
//! order, the per-session visibility flag - lives as a JSON value attached
//! to some owning entity under a `(owner, namespace, key)` triple. Sessions
//! never share memory; they share this store plus a push channel, and any
//! session re-reads the store on its next render.
//!
//! The store is eventually consistent by construction: a write is visible
//! to other sessions whenever they next read, not at any bounded instant.
//!
//! Two backends ship here: [`MemoryStore`] for tests and in-process
//! simulation, and [`JsonFileStore`] for durable client-local state.

mod error;
mod file;
mod memory;

pub use error::{Error, Result};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A key/value attribute store attached to shared entities.
///
/// Values are JSON-serializable blobs; the store neither interprets nor
/// validates them. Reads of absent keys return `Ok(None)`.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Read the value stored under `(owner, namespace, key)`.
    async fn get(&self, owner: &str, namespace: &str, key: &str) -> Result<Option<Value>>;

    /// Overwrite the value stored under `(owner, namespace, key)`.
    async fn set(&self, owner: &str, namespace: &str, key: &str, value: Value) -> Result<()>;
}

/// Typed convenience layer over [`AttributeStore`].
#[async_trait]
pub trait AttributeStoreExt: AttributeStore {
    /// Read and deserialize a typed value.
    async fn get_typed<T: DeserializeOwned + Send>(
        &self,
        owner: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<T>> {
        match self.get(owner, namespace, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a typed value.
    async fn set_typed<T: Serialize + Sync>(
        &self,
        owner: &str,
        namespace: &str,
        key: &str,
        value: &T,
    ) -> Result<()> {
        self.set(owner, namespace, key, serde_json::to_value(value)?)
            .await
    }
}

#[async_trait]
impl<S: AttributeStore + ?Sized> AttributeStoreExt for S {}
