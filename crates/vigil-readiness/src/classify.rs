//! Roll-to-tier classification.
//!
//! Thresholds are fixed: `>= 20` tier 3, `>= 10` tier 2, below that tier 1.
//! The mapping from tier to pip pattern depends on the classifier mode.

use crate::state::{Pip, PipKind, ReadinessState, PIP_COUNT};
use thiserror::Error;

/// Lowest value accepted by manual readiness entry.
pub const MANUAL_ENTRY_MIN: i32 = 1;

/// Highest value accepted by manual readiness entry.
pub const MANUAL_ENTRY_MAX: i32 = 30;

/// Readiness buckets derived from a roll total. The tier number doubles
/// as the lit pip count under the standard mode; labels only exist under
/// the alternative mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
}

impl Tier {
    /// Bucket a roll total. Both boundaries are inclusive upward.
    pub const fn from_total(total: i32) -> Self {
        if total >= 20 {
            Self::Three
        } else if total >= 10 {
            Self::Two
        } else {
            Self::One
        }
    }
}

/// World-scoped classifier mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassifierMode {
    /// Neutral pips only, one lit per tier, no label.
    #[default]
    Standard,
    /// All pips lit, colored by tier, with a tier label.
    Alternative,
}

/// Which label tier 2 carries under [`ClassifierMode::Alternative`].
///
/// Revisions of the tracker shipped both spellings; the choice is exposed
/// as configuration rather than guessed. `Ready` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TierTwoLabel {
    #[default]
    Ready,
    Alert,
}

impl TierTwoLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Alert => "Alert",
        }
    }
}

/// Rejection of an out-of-range manual readiness entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("manual readiness entry {value} outside {MANUAL_ENTRY_MIN}..={MANUAL_ENTRY_MAX}")]
pub struct ManualEntryError {
    pub value: i32,
}

/// Map a roll total to a readiness record.
///
/// Pure and deterministic: identical inputs always produce identical output.
pub fn classify(total: i32, mode: ClassifierMode, tier_two: TierTwoLabel) -> ReadinessState {
    let tier = Tier::from_total(total);
    match mode {
        ClassifierMode::Standard => {
            let lit = tier as usize;
            let mut pips = [Pip::dark(); PIP_COUNT];
            for pip in pips.iter_mut().take(lit) {
                *pip = Pip::lit(PipKind::Neutral);
            }
            ReadinessState {
                readiness: String::new(),
                pips,
            }
        }
        ClassifierMode::Alternative => {
            let (label, pips) = match tier {
                Tier::Three => (
                    "Vigilant",
                    [
                        Pip::lit(PipKind::Inspired),
                        Pip::lit(PipKind::Inspired),
                        Pip::lit(PipKind::Neutral),
                    ],
                ),
                Tier::Two => (tier_two.as_str(), [Pip::lit(PipKind::Neutral); PIP_COUNT]),
                Tier::One => (
                    "Hesitant",
                    [
                        Pip::lit(PipKind::Bane),
                        Pip::lit(PipKind::Bane),
                        Pip::lit(PipKind::Neutral),
                    ],
                ),
            };
            ReadinessState {
                readiness: label.to_string(),
                pips,
            }
        }
    }
}

/// Classify a manually entered value in place of a roll total.
///
/// Values outside `[1, 30]` are rejected without producing a record; the
/// caller clears the input and warns, leaving stored state untouched.
pub fn classify_manual(
    value: i32,
    mode: ClassifierMode,
    tier_two: TierTwoLabel,
) -> Result<ReadinessState, ManualEntryError> {
    if !(MANUAL_ENTRY_MIN..=MANUAL_ENTRY_MAX).contains(&value) {
        return Err(ManualEntryError { value });
    }
    Ok(classify(value, mode, tier_two))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(total: i32) -> ReadinessState {
        classify(total, ClassifierMode::Standard, TierTwoLabel::default())
    }

    fn alternative(total: i32) -> ReadinessState {
        classify(total, ClassifierMode::Alternative, TierTwoLabel::default())
    }

    #[test]
    fn tier_boundaries_inclusive_upward() {
        assert_eq!(Tier::from_total(20), Tier::Three);
        assert_eq!(Tier::from_total(19), Tier::Two);
        assert_eq!(Tier::from_total(10), Tier::Two);
        assert_eq!(Tier::from_total(9), Tier::One);
        assert_eq!(Tier::from_total(-3), Tier::One);
        assert_eq!(Tier::from_total(37), Tier::Three);
    }

    #[test]
    fn standard_lights_one_pip_per_tier() {
        assert_eq!(standard(9).active_pip_count(), 1);
        assert_eq!(standard(15).active_pip_count(), 2);
        assert_eq!(standard(25).active_pip_count(), 3);
    }

    #[test]
    fn standard_label_is_empty_and_pips_neutral() {
        for total in [3, 14, 22] {
            let state = standard(total);
            assert!(state.readiness.is_empty());
            for pip in &state.pips {
                assert_eq!(pip.kind, PipKind::Neutral);
            }
        }
    }

    #[test]
    fn alternative_labels_by_tier() {
        assert_eq!(alternative(20).readiness, "Vigilant");
        assert_eq!(alternative(10).readiness, "Ready");
        assert_eq!(alternative(5).readiness, "Hesitant");
    }

    #[test]
    fn alternative_tier_two_label_is_configurable() {
        let state = classify(12, ClassifierMode::Alternative, TierTwoLabel::Alert);
        assert_eq!(state.readiness, "Alert");
    }

    #[test]
    fn alternative_pip_patterns() {
        let high = alternative(23);
        assert_eq!(high.pips[0], Pip::lit(PipKind::Inspired));
        assert_eq!(high.pips[1], Pip::lit(PipKind::Inspired));
        assert_eq!(high.pips[2], Pip::lit(PipKind::Neutral));

        let mid = alternative(14);
        assert!(mid.pips.iter().all(|p| *p == Pip::lit(PipKind::Neutral)));

        let low = alternative(4);
        assert_eq!(low.pips[0], Pip::lit(PipKind::Bane));
        assert_eq!(low.pips[1], Pip::lit(PipKind::Bane));
        assert_eq!(low.pips[2], Pip::lit(PipKind::Neutral));
    }

    #[test]
    fn manual_entry_accepts_full_range() {
        for value in [1, 10, 20, 30] {
            assert!(classify_manual(value, ClassifierMode::Standard, TierTwoLabel::Ready).is_ok());
        }
    }

    #[test]
    fn manual_entry_rejects_out_of_range() {
        for value in [0, -5, 31, 100] {
            let err = classify_manual(value, ClassifierMode::Standard, TierTwoLabel::Ready)
                .unwrap_err();
            assert_eq!(err.value, value);
        }
    }

    #[test]
    fn manual_entry_uses_classifier_thresholds() {
        // The original manual path was off by one from the roll path
        // (>= 21 / >= 11); both now go through the same thresholds.
        let at_twenty =
            classify_manual(20, ClassifierMode::Alternative, TierTwoLabel::Ready).unwrap();
        assert_eq!(at_twenty.readiness, "Vigilant");
        let at_ten =
            classify_manual(10, ClassifierMode::Alternative, TierTwoLabel::Ready).unwrap();
        assert_eq!(at_ten.readiness, "Ready");
    }
}
