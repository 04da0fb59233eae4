//! Per-participant readiness storage with serialized writes.
//!
//! Readiness records live in the shared attribute store under the tracker
//! namespace. Reads default lazily; writes are full-record overwrites.
//!
//! Pip toggles are read-modify-write, so two quick interactions on the
//! same participant could silently lose one update. Every mutation here
//! goes through a per-participant mailbox task instead: ops on one
//! participant apply strictly in submission order, ops on different
//! participants stay independent. Writes racing from another process on
//! the same participant remain last-write-wins; that gap is accepted for
//! human-paced interaction.

use crate::bus::{Notice, SyncBus};
use crate::error::{Error, Result};
use crate::roster::ParticipantId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, warn};
use vigil_readiness::{Pip, PipKind, ReadinessState, PIP_COUNT};
use vigil_store::{AttributeStore, AttributeStoreExt};

/// Attribute namespace for everything the tracker persists.
pub const NAMESPACE: &str = "vigil-tracker";

/// Attribute key holding a participant's readiness record.
pub const STATE_KEY: &str = "state";

/// Modifier key held during a pip click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleModifier {
    /// No modifier: plain toggle.
    None,
    /// Shift: mark the pip inspired.
    Shift,
    /// Alt / secondary: mark the pip bane.
    Alt,
}

/// What fill-row does to pips that are already lit inspired/bane.
///
/// Revisions of the tracker shipped both behaviors; the choice is
/// configuration. [`FillPolicy::PreserveSpecial`] is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillPolicy {
    /// Light every pip neutral and clear the readiness label.
    NeutralizeAll,
    /// Keep lit inspired/bane pips, light the rest neutral, keep the label.
    #[default]
    PreserveSpecial,
}

/// Apply the pip toggle rule to one slot.
///
/// Active pip with no modifier goes dark; anything else lights the pip and
/// sets its kind from the modifier.
pub fn apply_toggle(mut state: ReadinessState, index: usize, modifier: ToggleModifier) -> ReadinessState {
    let pip = &mut state.pips[index];
    if pip.active && modifier == ToggleModifier::None {
        pip.active = false;
    } else {
        let kind = match modifier {
            ToggleModifier::Shift => PipKind::Inspired,
            ToggleModifier::Alt => PipKind::Bane,
            ToggleModifier::None => PipKind::Neutral,
        };
        *pip = Pip::lit(kind);
    }
    state
}

/// Apply a fill-row policy to a record.
pub fn apply_fill(mut state: ReadinessState, policy: FillPolicy) -> ReadinessState {
    match policy {
        FillPolicy::NeutralizeAll => {
            state.pips = [Pip::lit(PipKind::Neutral); PIP_COUNT];
            state.readiness.clear();
        }
        FillPolicy::PreserveSpecial => {
            for pip in &mut state.pips {
                if !(pip.active && pip.kind != PipKind::Neutral) {
                    *pip = Pip::lit(PipKind::Neutral);
                }
            }
        }
    }
    state
}

enum WriteOp {
    Set(ReadinessState),
    TogglePip {
        index: usize,
        modifier: ToggleModifier,
    },
    FillRow(FillPolicy),
}

struct Envelope {
    op: WriteOp,
    done: oneshot::Sender<Result<()>>,
}

/// Readiness store shared by every co-located session.
pub struct ParticipantStateStore {
    store: Arc<dyn AttributeStore>,
    bus: Arc<SyncBus>,
    mailboxes: Mutex<HashMap<ParticipantId, mpsc::Sender<Envelope>>>,
}

impl ParticipantStateStore {
    pub fn new(store: Arc<dyn AttributeStore>, bus: Arc<SyncBus>) -> Self {
        Self {
            store,
            bus,
            mailboxes: Mutex::new(HashMap::new()),
        }
    }

    /// Read a participant's record, or the documented default when none is
    /// stored.
    pub async fn get(&self, id: &ParticipantId) -> Result<ReadinessState> {
        let state = self
            .store
            .get_typed::<ReadinessState>(id.as_str(), NAMESPACE, STATE_KEY)
            .await?
            .unwrap_or_default();
        Ok(state)
    }

    /// Overwrite a participant's record.
    pub async fn set(&self, id: &ParticipantId, state: ReadinessState) -> Result<()> {
        self.submit(id, WriteOp::Set(state)).await
    }

    /// Toggle one pip by index, as a single logical transaction.
    pub async fn toggle_pip(
        &self,
        id: &ParticipantId,
        index: usize,
        modifier: ToggleModifier,
    ) -> Result<()> {
        if index >= PIP_COUNT {
            return Err(Error::PipIndex(index));
        }
        self.submit(id, WriteOp::TogglePip { index, modifier }).await
    }

    /// Light the whole row under the given policy.
    pub async fn fill_row(&self, id: &ParticipantId, policy: FillPolicy) -> Result<()> {
        self.submit(id, WriteOp::FillRow(policy)).await
    }

    async fn submit(&self, id: &ParticipantId, op: WriteOp) -> Result<()> {
        let tx = self.mailbox(id).await;
        let (done, ack) = oneshot::channel();
        tx.send(Envelope { op, done })
            .await
            .map_err(|_| Error::Mailbox(id.to_string()))?;
        ack.await.map_err(|_| Error::Mailbox(id.to_string()))?
    }

    async fn mailbox(&self, id: &ParticipantId) -> mpsc::Sender<Envelope> {
        let mut mailboxes = self.mailboxes.lock().await;
        if let Some(tx) = mailboxes.get(id) {
            return tx.clone();
        }
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(writer_task(
            id.clone(),
            rx,
            Arc::clone(&self.store),
            Arc::clone(&self.bus),
        ));
        mailboxes.insert(id.clone(), tx.clone());
        tx
    }
}

/// One writer task per participant: ops apply strictly in arrival order.
async fn writer_task(
    id: ParticipantId,
    mut rx: mpsc::Receiver<Envelope>,
    store: Arc<dyn AttributeStore>,
    bus: Arc<SyncBus>,
) {
    debug!(participant = %id, "participant writer started");
    while let Some(Envelope { op, done }) = rx.recv().await {
        let result = apply_op(&id, op, store.as_ref(), &bus).await;
        if let Err(err) = &result {
            warn!(participant = %id, %err, "readiness write failed");
        }
        let _ = done.send(result);
    }
    debug!(participant = %id, "participant writer stopped");
}

async fn apply_op(
    id: &ParticipantId,
    op: WriteOp,
    store: &dyn AttributeStore,
    bus: &SyncBus,
) -> Result<()> {
    let next = match op {
        WriteOp::Set(state) => state,
        WriteOp::TogglePip { index, modifier } => {
            let current = store
                .get_typed::<ReadinessState>(id.as_str(), NAMESPACE, STATE_KEY)
                .await?
                .unwrap_or_default();
            apply_toggle(current, index, modifier)
        }
        WriteOp::FillRow(policy) => {
            let current = store
                .get_typed::<ReadinessState>(id.as_str(), NAMESPACE, STATE_KEY)
                .await?
                .unwrap_or_default();
            apply_fill(current, policy)
        }
    };
    store
        .set_typed(id.as_str(), NAMESPACE, STATE_KEY, &next)
        .await?;
    bus.publish(Notice::StateChanged {
        participant: id.clone(),
    });
    Ok(())
}
