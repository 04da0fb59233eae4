//! Initiative dice evaluation.
//!
//! The tracker only consumes the integer total of `1d20 + modifier`; the
//! die itself sits behind [`DiceRoller`] so tests and replays can inject
//! fixed results.

use std::sync::Mutex;

/// Source of raw d20 results.
pub trait DiceRoller: Send + Sync {
    /// A single die result in `1..=20`.
    fn roll_d20(&self) -> i32;
}

/// Default roller backed by the thread RNG.
#[derive(Debug, Default)]
pub struct RandRoller;

impl DiceRoller for RandRoller {
    fn roll_d20(&self) -> i32 {
        use rand::Rng;
        rand::thread_rng().gen_range(1..=20)
    }
}

/// Roller that replays a scripted sequence, repeating the last value.
#[derive(Debug)]
pub struct FixedRoller {
    values: Mutex<Vec<i32>>,
    last: i32,
}

impl FixedRoller {
    /// Roller that always yields `value`.
    pub fn constant(value: i32) -> Self {
        Self {
            values: Mutex::new(Vec::new()),
            last: value,
        }
    }

    /// Roller that yields `values` front to back, then repeats the final
    /// one.
    pub fn sequence(values: impl IntoIterator<Item = i32>) -> Self {
        let mut values: Vec<i32> = values.into_iter().collect();
        let last = values.last().copied().unwrap_or(10);
        values.reverse();
        Self {
            values: Mutex::new(values),
            last,
        }
    }
}

impl DiceRoller for FixedRoller {
    fn roll_d20(&self) -> i32 {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.pop().unwrap_or(self.last)
    }
}

/// The `1d20 + modifier` initiative expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitiativeRoll {
    pub modifier: i32,
}

impl InitiativeRoll {
    pub const fn new(modifier: i32) -> Self {
        Self { modifier }
    }

    /// The dice expression handed to the evaluator.
    pub fn expression(&self) -> String {
        if self.modifier < 0 {
            format!("1d20 - {}", -self.modifier)
        } else {
            format!("1d20 + {}", self.modifier)
        }
    }

    /// Evaluate to a total using the given roller.
    pub fn evaluate(&self, roller: &dyn DiceRoller) -> i32 {
        roller.roll_d20() + self.modifier
    }
}

/// Flavor line shown while a participant's roll resolves, keyed by class.
pub fn roll_flavor(class_name: Option<&str>) -> &'static str {
    match class_name {
        Some("Berserker") => "Feeding inner fire...",
        Some("Cheat") => "Stacking the deck...",
        Some("Commander") => "Identifying weakness...",
        Some("Hunter") => "Marking prey...",
        Some("Mage") => "Incanting weave...",
        Some("Oathsworn") => "Anchoring resolve...",
        Some("Shadowmancer") => "Marshalling shadows...",
        Some("Shepherd") => "Calling kin...",
        Some("Songweaver") => "Seeking rhythm...",
        Some("Stormshifter") => "Invoking elements...",
        Some("Zephyr") => "Honing focus...",
        Some("Hexbinder") => "Consulting with omens...",
        _ => "Preparing for glory...",
    }
}
