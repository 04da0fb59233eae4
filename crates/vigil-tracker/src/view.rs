//! Read-only view model.
//!
//! The rendering layer's entire picture of the tracker: an ordered list of
//! participant rows plus the combat-active flag. Store hiccups while
//! building a view degrade to warnings and defaults so the frontend always
//! has something coherent to paint.

use crate::bus::SessionRole;
use crate::roster::ParticipantId;
use crate::session::Session;
use tracing::warn;
use vigil_readiness::{Pip, ReadinessState, PIP_COUNT};

/// One rendered participant row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRow {
    pub id: ParticipantId,
    pub name: String,
    pub readiness: String,
    pub pips: [Pip; PIP_COUNT],
}

/// Snapshot handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerView {
    pub is_host: bool,
    pub combat_active: bool,
    /// Whether this session may render the tracker at all.
    pub visible: bool,
    pub rows: Vec<ParticipantRow>,
}

impl Session {
    /// Build the current view for this session.
    ///
    /// The host sees every player-controlled participant in ledger order;
    /// a viewer sees only its own row.
    pub async fn view(&self) -> TrackerView {
        let rows = match self.role {
            SessionRole::Host => {
                let live = self.ctx.roster.player_controlled_ids();
                let scene_id = self.ctx.scene.read().await.id.clone();
                let ordered = match self.ledger.resolve(&scene_id, &live).await {
                    Ok(ordered) => ordered,
                    Err(err) => {
                        warn!(session = %self.id, %err, "order resolve failed, using discovery order");
                        live
                    }
                };
                let mut rows = Vec::with_capacity(ordered.len());
                for id in ordered {
                    rows.push(self.row(id).await);
                }
                rows
            }
            SessionRole::Participant => match &self.own_participant {
                Some(id) => vec![self.row(id.clone()).await],
                None => Vec::new(),
            },
        };

        TrackerView {
            is_host: self.role == SessionRole::Host,
            combat_active: self.combat_active(),
            visible: self.is_visible(),
            rows,
        }
    }

    async fn row(&self, id: ParticipantId) -> ParticipantRow {
        let name = self
            .ctx
            .roster
            .get(&id)
            .map(|p| p.name)
            .unwrap_or_else(|| "No Character Assigned".to_string());
        let state = match self.ctx.participants.get(&id).await {
            Ok(state) => state,
            Err(err) => {
                warn!(participant = %id, %err, "state read failed, showing default");
                ReadinessState::default()
            }
        };
        ParticipantRow {
            id,
            name,
            readiness: state.readiness,
            pips: state.pips,
        }
    }
}
