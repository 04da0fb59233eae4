//! Typed action surface.
//!
//! The rendering framework's only inbound path: discrete actions handed to
//! [`Session::dispatch`](crate::session::Session::dispatch). This replaces
//! per-widget callbacks with one dispatch table, so role gating and logging
//! happen in exactly one place.

use crate::participants::ToggleModifier;
use crate::roster::ParticipantId;
use crate::scene::{SceneId, TokenId};

/// Answer to the end-combat prompt. Ending combat is irrevocable, so the
/// transition only happens on [`Confirmation::Confirmed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// Every action the tracker accepts.
#[derive(Debug, Clone)]
pub enum Action {
    /// Roll initiative; `participant: None` falls back to the session's
    /// own participant.
    RollInitiative { participant: Option<ParticipantId> },

    /// Enter a readiness value directly in place of a roll.
    ManualReadiness { participant: ParticipantId, value: i32 },

    /// Toggle one pip by index.
    TogglePip {
        participant: ParticipantId,
        index: usize,
        modifier: ToggleModifier,
    },

    /// Light a participant's whole pip row.
    FillRow { participant: ParticipantId },

    /// Persist a new display order for a scene (host only).
    Reorder {
        scene: SceneId,
        proposed: Vec<ParticipantId>,
    },

    /// Start combat and open every participant's tracker (host only).
    RequestInitiative,

    /// End combat behind a confirmation prompt (host only).
    EndCombat { confirmation: Confirmation },

    /// Ad-hoc highlight toggle on one token (host only).
    ToggleHighlight { token: TokenId },

    /// Flip a token's dead-status overlay (host only).
    ToggleDead { token: TokenId },
}

impl Action {
    /// Short identifier for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RollInitiative { .. } => "roll-initiative",
            Self::ManualReadiness { .. } => "manual-readiness",
            Self::TogglePip { .. } => "toggle-pip",
            Self::FillRow { .. } => "fill-row",
            Self::Reorder { .. } => "reorder",
            Self::RequestInitiative => "request-initiative",
            Self::EndCombat { .. } => "end-combat",
            Self::ToggleHighlight { .. } => "toggle-highlight",
            Self::ToggleDead { .. } => "toggle-dead",
        }
    }

    /// Whether only the host-role session may perform this action.
    pub fn host_only(&self) -> bool {
        matches!(
            self,
            Self::Reorder { .. }
                | Self::RequestInitiative
                | Self::EndCombat { .. }
                | Self::ToggleHighlight { .. }
                | Self::ToggleDead { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_gating_covers_session_and_scene_mutations() {
        assert!(Action::RequestInitiative.host_only());
        assert!(Action::EndCombat {
            confirmation: Confirmation::Confirmed
        }
        .host_only());
        assert!(Action::Reorder {
            scene: SceneId::new("s"),
            proposed: vec![],
        }
        .host_only());
        assert!(!Action::RollInitiative { participant: None }.host_only());
        assert!(!Action::FillRow {
            participant: ParticipantId::new("p"),
        }
        .host_only());
    }
}
