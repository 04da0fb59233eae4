//! Vigil Tracker - combat readiness across independent sessions.
//!
//! One coordinating host session and any number of participant viewer
//! sessions share a turn-based encounter without sharing memory. Each
//! session is an event-driven actor; everything they agree on flows
//! through two channels: the persisted attribute store (`vigil-store`)
//! read on next render, and the push bus ([`SyncBus`]) that wakes a
//! session when its visibility flag flips or a roll prompt lands.
//!
//! # Architecture
//!
//! - **Session**: the state machine driving the Idle/Active combat
//!   lifecycle; host-only transitions, typed action dispatch
//! - **Participants**: readiness records with per-participant serialized
//!   writes
//! - **Order**: the host-authored display order, merged with the live set
//! - **Highlight**: per-token ring/ping state for a combat round
//! - **Position**: client-local window position cache
//!
//! # Example
//!
//! ```ignore
//! let ctx = TrackerContext::new(store, bus, roster, scene, config, roller);
//! let mut host = Session::host(ctx.clone(), SessionId::new("host"));
//! host.dispatch(Action::RequestInitiative).await?;
//! ```

pub mod actions;
pub mod bus;
pub mod config;
pub mod dice;
pub mod error;
pub mod highlight;
pub mod order;
pub mod participants;
pub mod position;
pub mod roster;
pub mod scene;
pub mod session;
pub mod view;


pub use actions::{Action, Confirmation};
pub use bus::{Notice, SessionId, SessionRole, SyncBus};
pub use config::TrackerConfig;
pub use dice::{roll_flavor, DiceRoller, FixedRoller, InitiativeRoll, RandRoller};
pub use error::{Error, Result};
pub use highlight::{disposition_color, HighlightController, PLAYER_RING_COLOR};
pub use order::{is_permutation, merge_order, DisplayOrderLedger};
pub use participants::{
    apply_fill, apply_toggle, FillPolicy, ParticipantStateStore, ToggleModifier,
};
pub use position::{PositionCache, WindowPosition};
pub use roster::{Participant, ParticipantId, Roster};
pub use scene::{Disposition, Scene, SceneId, Token, TokenHighlight, TokenId};
pub use session::{CombatSession, CombatState, Session, TrackerContext};
pub use view::{ParticipantRow, TrackerView};
