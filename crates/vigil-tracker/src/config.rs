//! Tracker configuration.
//!
//! World-scoped knobs read from the environment, the same way a node picks
//! up its runtime settings. Everything has a default; unknown values fall
//! back to it with a warning.

use crate::participants::FillPolicy;
use tracing::warn;
use vigil_readiness::{ClassifierMode, TierTwoLabel};

/// Configuration for a tracker session.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerConfig {
    /// Roll classification mode (`standard` | `alternative`).
    pub classifier_mode: ClassifierMode,

    /// Tier-2 label under the alternative mode (`ready` | `alert`).
    pub tier_two_label: TierTwoLabel,

    /// Fill-row behavior (`preserve` | `neutralize`).
    pub fill_policy: FillPolicy,
}

impl TrackerConfig {
    /// Create config from environment variables with defaults.
    pub fn from_env() -> Self {
        let classifier_mode = match std::env::var("VIGIL_CLASSIFIER_MODE").as_deref() {
            Ok("alternative") => ClassifierMode::Alternative,
            Ok("standard") | Err(_) => ClassifierMode::Standard,
            Ok(other) => {
                warn!(value = other, "unknown VIGIL_CLASSIFIER_MODE, using standard");
                ClassifierMode::Standard
            }
        };

        let tier_two_label = match std::env::var("VIGIL_TIER_TWO_LABEL").as_deref() {
            Ok("alert") => TierTwoLabel::Alert,
            Ok("ready") | Err(_) => TierTwoLabel::Ready,
            Ok(other) => {
                warn!(value = other, "unknown VIGIL_TIER_TWO_LABEL, using ready");
                TierTwoLabel::Ready
            }
        };

        let fill_policy = match std::env::var("VIGIL_FILL_POLICY").as_deref() {
            Ok("neutralize") => FillPolicy::NeutralizeAll,
            Ok("preserve") | Err(_) => FillPolicy::PreserveSpecial,
            Ok(other) => {
                warn!(value = other, "unknown VIGIL_FILL_POLICY, using preserve");
                FillPolicy::PreserveSpecial
            }
        };

        Self {
            classifier_mode,
            tier_two_label,
            fill_policy,
        }
    }
}
