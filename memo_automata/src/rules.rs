// Rule evaluation: the pure per-cell transition function.
//
// Given a cell's current value and the aggregate of its Moore neighborhood,
// `next_value` decides the cell's value for the next generation. One rule set
// drives two dynamics, selected by `LifeMode`:
//
// - `Boolean`: classical birth/survival. Live cells either keep their value
//   or drop to 0; comparisons use the count of active neighbors.
// - `Continuous`: live cells grow or decay by the local mean activity times
//   `increment_scale`; survival compares against the neighborhood value sum
//   (center included), birth against that sum rounded to an integer.
//
// Survival is an inclusive range test on `[survive.lo, survive.hi]`. Birth is
// an exact-equality test against either endpoint of `born`, NOT a range.
// With born = [3, 6], a dead cell with 4 or 5 active neighbors stays dead.
//
// Births take a fresh uniform draw from a `UnitSource`, so the generator is
// injected rather than ambient and tests can script exact birth values.

use crate::error::ConfigError;
use memo_prng::CellRng;
use serde::{Deserialize, Serialize};

/// A closed `[lo, hi]` pair of rule thresholds.
///
/// `lo > hi` is allowed: the survive range is then empty, while birth still
/// matches either endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct RuleInterval {
    pub lo: f64,
    pub hi: f64,
}

impl RuleInterval {
    pub fn new(lo: f64, hi: f64) -> Result<Self, ConfigError> {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(ConfigError::NonFiniteRuleBound { lo, hi });
        }
        Ok(RuleInterval { lo, hi })
    }

    /// Inclusive range test, used for survival.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lo && x <= self.hi
    }

    /// Exact match against either endpoint, used for birth.
    pub fn hits_endpoint(&self, x: f64) -> bool {
        x == self.lo || x == self.hi
    }
}

impl TryFrom<[f64; 2]> for RuleInterval {
    type Error = ConfigError;

    fn try_from([lo, hi]: [f64; 2]) -> Result<Self, Self::Error> {
        RuleInterval::new(lo, hi)
    }
}

impl From<RuleInterval> for [f64; 2] {
    fn from(interval: RuleInterval) -> Self {
        [interval.lo, interval.hi]
    }
}

/// Which dynamic the rule set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifeMode {
    /// Discrete on/off birth and death.
    Boolean,
    /// Fractional growth and decay scaled by local activity.
    #[default]
    Continuous,
}

impl LifeMode {
    pub fn from_boolean_life(on: bool) -> Self {
        if on { LifeMode::Boolean } else { LifeMode::Continuous }
    }

    pub fn is_boolean(self) -> bool {
        self == LifeMode::Boolean
    }
}

/// The complete set of tunable rule parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSet {
    pub born: RuleInterval,
    pub survive: RuleInterval,
    pub mode: LifeMode,
    /// Strictly positive; validated by the grid's setter.
    pub increment_scale: f64,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            born: RuleInterval { lo: 3.0, hi: 6.0 },
            survive: RuleInterval { lo: 2.0, hi: 3.0 },
            mode: LifeMode::Continuous,
            increment_scale: 0.1,
        }
    }
}

/// Aggregate of a cell's in-bounds Moore neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeighborStats {
    /// Neighbors with a value strictly greater than 0.
    pub active: u32,
    /// Sum of all neighbor values, active or not.
    pub sum: f64,
}

/// A source of uniform draws in [0, 1).
pub trait UnitSource {
    fn next_unit(&mut self) -> f64;

    /// `true` with probability `p`, consuming one draw.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

impl UnitSource for CellRng {
    fn next_unit(&mut self) -> f64 {
        self.next_f64()
    }

    fn chance(&mut self, p: f64) -> bool {
        self.random_bool(p)
    }
}

/// Replays a fixed list of values in a loop. Lets callers pin exact birth
/// values; an empty script always yields 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<f64>) -> Self {
        ScriptedSource { values, cursor: 0 }
    }

    /// How many values have been handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UnitSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// Compute a cell's next value. The result is always within [0, 1].
pub fn next_value(
    value: f64,
    stats: NeighborStats,
    rules: &RuleSet,
    rng: &mut impl UnitSource,
) -> f64 {
    let alive = value > 0.0;
    if !alive && stats.active == 0 {
        return 0.0;
    }

    let total = stats.sum + value;
    let mean = total / (f64::from(stats.active) + 1.0);
    // Totals are non-negative, so half-away-from-zero is round-half-up.
    let rounded = total.round();

    let (survive_cmp, birth_cmp) = match rules.mode {
        LifeMode::Boolean => (f64::from(stats.active), f64::from(stats.active)),
        LifeMode::Continuous => (total, rounded),
    };

    let next = if alive {
        match (rules.survive.contains(survive_cmp), rules.mode) {
            (false, LifeMode::Boolean) => 0.0,
            (false, LifeMode::Continuous) => value - mean * rules.increment_scale,
            (true, LifeMode::Boolean) => value,
            (true, LifeMode::Continuous) => value + (mean * rules.increment_scale).min(1.0),
        }
    } else if rules.born.hits_endpoint(birth_cmp) {
        rng.next_unit()
    } else {
        0.0
    };

    next.clamp(0.0, 1.0)
}
