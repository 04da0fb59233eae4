//! Client-local window position and visibility preference cache.
//!
//! Best-effort only: the cache is never authoritative, and a failed read
//! or write degrades to a warning with the tracker carrying on. For
//! participants the host's visibility broadcast always outranks the saved
//! preference.

use crate::bus::SessionId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use vigil_store::{AttributeStore, AttributeStoreExt};

/// Attribute namespace for client-local state.
pub const CLIENT_NAMESPACE: &str = "client";

/// Attribute key for the cached window position.
pub const POSITION_KEY: &str = "position";

/// Attribute key for the client's tracker-visible preference.
pub const VISIBLE_KEY: &str = "trackerVisible";

/// Last-known window position of the tracker on this client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub left: f64,
    pub top: f64,
}

/// Per-session cache backed by a client-local store.
pub struct PositionCache {
    store: Arc<dyn AttributeStore>,
    session: SessionId,
}

impl PositionCache {
    pub fn new(store: Arc<dyn AttributeStore>, session: SessionId) -> Self {
        Self { store, session }
    }

    /// Save the window position. Failures warn and are dropped.
    pub async fn save_position(&self, position: WindowPosition) {
        if let Err(err) = self
            .store
            .set_typed(&self.session.0, CLIENT_NAMESPACE, POSITION_KEY, &position)
            .await
        {
            warn!(session = %self.session, %err, "failed to save window position");
        }
    }

    /// Restore the last saved position, if any.
    pub async fn restore_position(&self) -> Option<WindowPosition> {
        match self
            .store
            .get_typed::<WindowPosition>(&self.session.0, CLIENT_NAMESPACE, POSITION_KEY)
            .await
        {
            Ok(position) => position,
            Err(err) => {
                warn!(session = %self.session, %err, "failed to restore window position");
                None
            }
        }
    }

    /// Save the client's tracker-visible preference.
    pub async fn save_visible(&self, visible: bool) {
        if let Err(err) = self
            .store
            .set_typed(&self.session.0, CLIENT_NAMESPACE, VISIBLE_KEY, &visible)
            .await
        {
            warn!(session = %self.session, %err, "failed to save visibility preference");
        }
    }

    /// Restore the tracker-visible preference; defaults to hidden.
    pub async fn restore_visible(&self) -> bool {
        match self
            .store
            .get_typed::<bool>(&self.session.0, CLIENT_NAMESPACE, VISIBLE_KEY)
            .await
        {
            Ok(visible) => visible.unwrap_or(false),
            Err(err) => {
                warn!(session = %self.session, %err, "failed to restore visibility preference");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_store::MemoryStore;

    fn cache() -> PositionCache {
        PositionCache::new(Arc::new(MemoryStore::new()), SessionId::new("client-1"))
    }

    #[tokio::test]
    async fn position_round_trips() {
        let cache = cache();
        assert!(cache.restore_position().await.is_none());

        cache
            .save_position(WindowPosition { left: 120.0, top: 64.0 })
            .await;
        assert_eq!(
            cache.restore_position().await,
            Some(WindowPosition { left: 120.0, top: 64.0 })
        );
    }

    #[tokio::test]
    async fn visibility_preference_defaults_hidden() {
        let cache = cache();
        assert!(!cache.restore_visible().await);
        cache.save_visible(true).await;
        assert!(cache.restore_visible().await);
    }

    #[tokio::test]
    async fn caches_are_scoped_per_session() {
        let store: Arc<dyn AttributeStore> = Arc::new(MemoryStore::new());
        let a = PositionCache::new(Arc::clone(&store), SessionId::new("a"));
        let b = PositionCache::new(store, SessionId::new("b"));

        a.save_position(WindowPosition { left: 1.0, top: 2.0 }).await;
        assert!(b.restore_position().await.is_none());
    }
}
