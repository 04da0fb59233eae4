//! Token highlight controller.
//!
//! Derives and applies the per-token ring/ping state for a round of
//! combat. Player-owned tokens always get the fixed bright ring; other
//! tokens take their color from their disposition. Dead tokens are skipped
//! by both mass passes but stay individually toggleable.

use crate::bus::{Notice, SyncBus};
use crate::scene::{Disposition, Scene, Token, TokenHighlight};
use std::sync::Arc;
use tracing::debug;

/// Ring color for tokens owned by player-controlled participants.
pub const PLAYER_RING_COLOR: &str = "#33ccff";

/// Ring color derived from a non-player token's disposition.
pub const fn disposition_color(disposition: Disposition) -> &'static str {
    match disposition {
        Disposition::Friendly => "#43b581",
        Disposition::Neutral => "#c8c8c8",
        Disposition::Hostile => "#e8495f",
    }
}

fn ring_color_for(token: &Token) -> &'static str {
    if token.player_controlled {
        PLAYER_RING_COLOR
    } else {
        disposition_color(token.disposition)
    }
}

/// Applies and clears highlight state across a scene's tokens.
pub struct HighlightController {
    bus: Arc<SyncBus>,
}

impl HighlightController {
    pub fn new(bus: Arc<SyncBus>) -> Self {
        Self { bus }
    }

    /// Round-start pass: ring every visible, non-dead token and pulse its
    /// position. Idempotent - re-invoking before a reset reapplies the
    /// same colors.
    pub fn highlight_for_new_round(&self, scene: &mut Scene) {
        debug!(scene = %scene.id, "round-start highlight pass");
        for token in &mut scene.tokens {
            if !token.visible || token.dead {
                continue;
            }
            self.apply(token);
        }
    }

    /// Single-token pass run after a host-side roll. Skips dead tokens
    /// like the mass pass.
    pub fn highlight_token(&self, token: &mut Token) {
        if token.dead {
            return;
        }
        self.apply(token);
    }

    /// Exact inverse of the round-start pass over every visible token.
    pub fn reset_all(&self, scene: &mut Scene) {
        debug!(scene = %scene.id, "highlight reset");
        for token in &mut scene.tokens {
            if !token.visible || token.dead {
                continue;
            }
            token.highlight = TokenHighlight::default();
        }
    }

    /// Ad-hoc per-token marking: apply the highlight when no ring color is
    /// assigned, clear it otherwise. Callable on dead tokens via the
    /// dead-state control.
    pub fn toggle(&self, token: &mut Token) {
        if token.highlight.ring_color.is_none() {
            self.apply(token);
        } else {
            token.highlight = TokenHighlight::default();
        }
    }

    fn apply(&self, token: &mut Token) {
        token.highlight = TokenHighlight {
            ring_color: Some(ring_color_for(token).to_string()),
            ring_enabled: true,
            round_marker: true,
        };
        self.bus.publish(Notice::Ping {
            token: token.id.clone(),
            x: token.x,
            y: token.y,
        });
    }
}
