//! Display order ledger.
//!
//! The host can drag participant rows into a preferred order; the result
//! persists on the active scene entity. The persisted order is advisory:
//! it need not mention every live participant, and stale ids are ignored.
//! Rendering merges it with the live set via [`DisplayOrderLedger::resolve`].

use crate::bus::{Notice, SyncBus};
use crate::error::{Error, Result};
use crate::roster::ParticipantId;
use crate::scene::SceneId;
use crate::participants::NAMESPACE;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use vigil_store::{AttributeStore, AttributeStoreExt};

/// Attribute key holding a scene's display order.
pub const ORDER_KEY: &str = "order";

/// Check that `proposed` is a permutation of `displayed`: no duplicates,
/// nothing missing, nothing extra.
pub fn is_permutation(proposed: &[ParticipantId], displayed: &[ParticipantId]) -> bool {
    if proposed.len() != displayed.len() {
        return false;
    }
    let proposed_set: HashSet<&ParticipantId> = proposed.iter().collect();
    if proposed_set.len() != proposed.len() {
        return false;
    }
    displayed.iter().all(|id| proposed_set.contains(id))
}

/// Merge a persisted order with the live participant set.
///
/// Persisted ids still live come first, in persisted order; live ids the
/// order never mentioned follow in their given (discovery) order.
pub fn merge_order(persisted: &[ParticipantId], live: &[ParticipantId]) -> Vec<ParticipantId> {
    let live_set: HashSet<&ParticipantId> = live.iter().collect();
    let mut merged: Vec<ParticipantId> = persisted
        .iter()
        .filter(|id| live_set.contains(id))
        .cloned()
        .collect();
    let mentioned: HashSet<&ParticipantId> = merged.iter().collect();
    let mut tail: Vec<ParticipantId> = live
        .iter()
        .filter(|id| !mentioned.contains(id))
        .cloned()
        .collect();
    merged.append(&mut tail);
    merged
}

/// Scene-scoped ordering persisted through the attribute store.
pub struct DisplayOrderLedger {
    store: Arc<dyn AttributeStore>,
    bus: Arc<SyncBus>,
}

impl DisplayOrderLedger {
    pub fn new(store: Arc<dyn AttributeStore>, bus: Arc<SyncBus>) -> Self {
        Self { store, bus }
    }

    /// The rendering order for `live` participants on this scene.
    pub async fn resolve(
        &self,
        scene: &SceneId,
        live: &[ParticipantId],
    ) -> Result<Vec<ParticipantId>> {
        let persisted = self
            .store
            .get_typed::<Vec<ParticipantId>>(&scene.0, NAMESPACE, ORDER_KEY)
            .await?
            .unwrap_or_default();
        Ok(merge_order(&persisted, live))
    }

    /// Persist a new order, or reject it when it is not a permutation of
    /// the displayed set. Rejection keeps the prior order; the caller
    /// re-renders from it.
    pub async fn reorder(
        &self,
        scene: &SceneId,
        proposed: &[ParticipantId],
        displayed: &[ParticipantId],
    ) -> Result<()> {
        if !is_permutation(proposed, displayed) {
            return Err(Error::InvalidReorder(format!(
                "proposed order of {} ids is not a permutation of the {} displayed",
                proposed.len(),
                displayed.len()
            )));
        }
        self.store
            .set_typed(&scene.0, NAMESPACE, ORDER_KEY, &proposed)
            .await?;
        debug!(%scene, "display order persisted");
        self.bus.publish(Notice::OrderChanged {
            scene: scene.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_store::MemoryStore;

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(*n)).collect()
    }

    fn ledger() -> DisplayOrderLedger {
        DisplayOrderLedger::new(Arc::new(MemoryStore::new()), Arc::new(SyncBus::new(16)))
    }

    #[test]
    fn merge_appends_unmentioned_live_ids() {
        assert_eq!(
            merge_order(&ids(&["b", "a"]), &ids(&["a", "b", "c"])),
            ids(&["b", "a", "c"])
        );
    }

    #[test]
    fn merge_of_empty_order_is_discovery_order() {
        assert_eq!(merge_order(&[], &ids(&["a", "b"])), ids(&["a", "b"]));
    }

    #[test]
    fn merge_drops_stale_ids() {
        assert_eq!(
            merge_order(&ids(&["gone", "b", "a"]), &ids(&["a", "b"])),
            ids(&["b", "a"])
        );
    }

    #[test]
    fn permutation_check_catches_duplicates_and_gaps() {
        let displayed = ids(&["a", "b", "c"]);
        assert!(is_permutation(&ids(&["c", "a", "b"]), &displayed));
        assert!(!is_permutation(&ids(&["a", "a", "b"]), &displayed));
        assert!(!is_permutation(&ids(&["a", "b"]), &displayed));
        assert!(!is_permutation(&ids(&["a", "b", "d"]), &displayed));
    }

    #[tokio::test]
    async fn reorder_round_trips_through_resolve() {
        let ledger = ledger();
        let scene = SceneId::new("scene-1");
        let live = ids(&["a", "b", "c"]);

        ledger.reorder(&scene, &ids(&["c", "a", "b"]), &live).await.unwrap();
        let resolved = ledger.resolve(&scene, &live).await.unwrap();
        assert_eq!(resolved, ids(&["c", "a", "b"]));
    }

    #[tokio::test]
    async fn invalid_reorder_keeps_prior_order() {
        let ledger = ledger();
        let scene = SceneId::new("scene-1");
        let live = ids(&["a", "b", "c"]);

        ledger.reorder(&scene, &ids(&["b", "a", "c"]), &live).await.unwrap();
        let err = ledger
            .reorder(&scene, &ids(&["b", "b", "c"]), &live)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidReorder(_)));

        let resolved = ledger.resolve(&scene, &live).await.unwrap();
        assert_eq!(resolved, ids(&["b", "a", "c"]));
    }

    #[tokio::test]
    async fn new_participant_appears_after_persisted_order() {
        let ledger = ledger();
        let scene = SceneId::new("scene-1");
        ledger
            .reorder(&scene, &ids(&["b", "a"]), &ids(&["a", "b"]))
            .await
            .unwrap();

        let resolved = ledger.resolve(&scene, &ids(&["a", "b", "c"])).await.unwrap();
        assert_eq!(resolved, ids(&["b", "a", "c"]));
    }
}
