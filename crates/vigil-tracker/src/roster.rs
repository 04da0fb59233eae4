//! Participant roster - the live set of entities with readiness state.
//!
//! The roster is an external registry as far as the tracker is concerned:
//! the tracker reads it to enumerate rows and resolve roll targets, never
//! writes it. Entries keep discovery order, which is the fallback ordering
//! when the display order ledger does not mention a participant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};

/// A unique participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Whether a player controls this entity (only these get tracker rows).
    pub player_controlled: bool,
    /// Dexterity modifier added to the initiative die.
    pub modifier: i32,
    /// Class name, used for the roll flavor line.
    pub class_name: Option<String>,
}

/// Shared, read-mostly participant registry.
///
/// Cloning yields a handle to the same roster.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Arc<RwLock<Vec<Participant>>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant at the end of discovery order.
    pub fn add(&self, participant: Participant) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(participant);
    }

    /// Look up a participant by id.
    pub fn get(&self, id: &ParticipantId) -> Option<Participant> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().find(|p| &p.id == id).cloned()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.get(id).is_some()
    }

    /// Player-controlled participants in discovery order.
    pub fn player_controlled(&self) -> Vec<Participant> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().filter(|p| p.player_controlled).cloned().collect()
    }

    /// Ids of player-controlled participants in discovery order.
    pub fn player_controlled_ids(&self) -> Vec<ParticipantId> {
        self.player_controlled().into_iter().map(|p| p.id).collect()
    }
}
