//! Readiness classification for the Vigil combat tracker.
//!
//! A participant's "combat readiness" is a tiny record: a tier label and a
//! row of exactly three pip markers. This crate owns that record and the
//! deterministic mapping from a d20 roll total to it.
//!
//! # Tiers
//!
//! Roll totals bucket into three tiers with fixed thresholds:
//! - `total >= 20` → tier 3
//! - `total >= 10` → tier 2
//! - otherwise    → tier 1
//!
//! Both boundaries are inclusive upward: a 20 is tier 3, a 10 is tier 2.
//!
//! # Modes
//!
//! Two classifier modes exist as a world-scoped setting. `Standard` lights
//! one neutral pip per tier and leaves the label empty. `Alternative` lights
//! all three pips and colors them by tier (inspired for tier 3, bane for
//! tier 1) with a label - Vigilant, Ready/Alert, or Hesitant.
//!
//! Everything here is pure and synchronous so it can be tested without a
//! live roll.

mod classify;
mod state;

pub use classify::{
    classify, classify_manual, ClassifierMode, ManualEntryError, Tier, TierTwoLabel,
    MANUAL_ENTRY_MAX, MANUAL_ENTRY_MIN,
};
pub use state::{Pip, PipKind, ReadinessState, PIP_COUNT};
