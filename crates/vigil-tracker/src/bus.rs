//! Cross-session push channel.
//!
//! Sessions never read each other's state. All coordination they observe
//! arrives here: a per-session visibility flag (a watch channel only that
//! session holds the receiving end of) and a broadcast notice stream for
//! roll prompts, re-render nudges, and scene pings.
//!
//! Delivery is at-least-once - the host re-sends the visibility value even
//! when it has not changed - so every consumer must apply flags and notices
//! idempotently.

use crate::roster::ParticipantId;
use crate::scene::{SceneId, TokenId};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use tokio::sync::{broadcast, watch};
use tracing::{trace, warn};

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// The single coordinating session; may start/end combat, reorder, and
    /// mass-update highlights.
    Host,
    /// A viewer session bound to one participant.
    Participant,
}

/// Notices pushed to every subscribed session.
#[derive(Debug, Clone)]
pub enum Notice {
    /// The host asked everyone to roll initiative.
    RollPrompt,
    /// A participant's readiness record changed; re-read on next render.
    StateChanged { participant: ParticipantId },
    /// The display order for a scene changed.
    OrderChanged { scene: SceneId },
    /// A roll resolved; carries the chat-style summary for the frontend.
    RollResolved {
        participant: ParticipantId,
        total: i32,
        flavor: String,
        summary: String,
    },
    /// Transient visual pulse at a token's position.
    Ping { token: TokenId, x: f64, y: f64 },
}

/// The shared push/broadcast channel between sessions.
pub struct SyncBus {
    notices: broadcast::Sender<Notice>,
    flags: RwLock<HashMap<SessionId, (SessionRole, watch::Sender<bool>)>>,
}

impl SyncBus {
    /// Create a bus able to buffer `capacity` undelivered notices per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (notices, _) = broadcast::channel(capacity);
        Self {
            notices,
            flags: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session and hand back the receiving end of its own
    /// visibility flag. No other session can observe this flag.
    pub fn register(&self, id: SessionId, role: SessionRole) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        let mut flags = self.flags.write().unwrap_or_else(|e| e.into_inner());
        flags.insert(id, (role, tx));
        rx
    }

    /// Subscribe to the notice stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Publish a notice to all subscribers. Nobody listening is not an
    /// error.
    pub fn publish(&self, notice: Notice) {
        trace!(?notice, "bus publish");
        let _ = self.notices.send(notice);
    }

    /// Point-to-point: set one session's visibility flag.
    pub fn set_visibility(&self, session: &SessionId, visible: bool) {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        match flags.get(session) {
            Some((_, tx)) => {
                // send_replace wakes the watcher even when the value is
                // unchanged: at-least-once delivery.
                tx.send_replace(visible);
            }
            None => warn!(%session, "visibility flag for unregistered session dropped"),
        }
    }

    /// Set the visibility flag of every participant-role session.
    pub fn set_participant_visibility(&self, visible: bool) {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        for (id, (role, tx)) in flags.iter() {
            if *role == SessionRole::Participant {
                trace!(session = %id, visible, "visibility broadcast");
                tx.send_replace(visible);
            }
        }
    }
}
