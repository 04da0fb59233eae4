//! Scene tokens and their highlight state.
//!
//! A token is the on-scene visual for a participant or any other entity.
//! Its highlight fields are derived, ephemeral state owned by the scene;
//! readiness state never lives here.

use crate::roster::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique scene identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique token identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Faction of a non-player token, used to derive its ring color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Friendly,
    Neutral,
    Hostile,
}

/// Visual highlight state on one token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHighlight {
    /// Assigned ring color, if any.
    pub ring_color: Option<String>,
    /// Whether the ring is drawn.
    pub ring_enabled: bool,
    /// "Turn taken" marker set by the round-start pass.
    pub round_marker: bool,
}

impl TokenHighlight {
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// One on-scene token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    /// Owning participant, when the token represents one.
    pub participant: Option<ParticipantId>,
    /// Whether the owning entity is player-controlled.
    pub player_controlled: bool,
    pub disposition: Disposition,
    /// Hidden tokens are skipped by mass highlight passes.
    pub visible: bool,
    /// Dead-status overlay; an external toggle the tracker only reads
    /// during mass passes and flips via the dead-state control.
    pub dead: bool,
    pub x: f64,
    pub y: f64,
    pub highlight: TokenHighlight,
}

impl Token {
    pub fn new(id: impl Into<String>, disposition: Disposition) -> Self {
        Self {
            id: TokenId::new(id),
            participant: None,
            player_controlled: false,
            disposition,
            visible: true,
            dead: false,
            x: 0.0,
            y: 0.0,
            highlight: TokenHighlight::default(),
        }
    }

    pub fn for_participant(
        id: impl Into<String>,
        participant: ParticipantId,
        player_controlled: bool,
    ) -> Self {
        Self {
            participant: Some(participant),
            player_controlled,
            ..Self::new(id, Disposition::Friendly)
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// The active scene: id plus its token set.
///
/// Scene-scoped state is a shared resource mutated only by the host-role
/// session; viewers hold read access.
#[derive(Debug, Clone)]
pub struct Scene {
    pub id: SceneId,
    pub tokens: Vec<Token>,
}

impl Scene {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: SceneId::new(id),
            tokens: Vec::new(),
        }
    }

    pub fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn token(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| &t.id == id)
    }

    pub fn token_mut(&mut self, id: &TokenId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| &t.id == id)
    }

    pub fn token_for_participant_mut(&mut self, id: &ParticipantId) -> Option<&mut Token> {
        self.tokens
            .iter_mut()
            .find(|t| t.participant.as_ref() == Some(id))
    }
}
