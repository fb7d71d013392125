// Data-driven automaton configuration.
//
// `AutomatonConfig` holds everything needed to construct a `Grid`: the
// dimensions, both rule intervals, the life mode, the increment scale and
// the PRNG seed. It replaces the module-level globals of a host script with
// one explicit value that can be loaded from JSON, validated once, and
// handed to `Grid::from_config`.
//
// Every field has a default (`#[serde(default)]`), so a config file only
// needs to name what it changes:
//
//     { "columns": 16, "born": [3, 3], "boolean_life": true }
//
// Defaults match the stock instrument: an 8×8 grid, born = [3, 6],
// survive = [2, 3], continuous mode, increment scale 0.1.
//
// See also: `grid.rs` (consumer), `main.rs` (loads the file and applies CLI
// overrides before validating).

use crate::error::ConfigError;
use crate::rules::{LifeMode, RuleInterval, RuleSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    pub columns: usize,
    pub rows: usize,
    /// Birth thresholds, matched by exact equality against either endpoint.
    pub born: RuleInterval,
    /// Inclusive survival range.
    pub survive: RuleInterval,
    /// `true` selects discrete on/off rules, `false` continuous growth/decay.
    pub boolean_life: bool,
    /// Scale of the per-step increment/decrement in continuous mode.
    pub increment_scale: f64,
    /// Seed for the birth-value generator.
    pub seed: u64,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        let rules = RuleSet::default();
        AutomatonConfig {
            columns: 8,
            rows: 8,
            born: rules.born,
            survive: rules.survive,
            boolean_life: rules.mode.is_boolean(),
            increment_scale: rules.increment_scale,
            seed: 0,
        }
    }
}

impl AutomatonConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AutomatonConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.columns, self.rows)?;
        validate_increment_scale(self.increment_scale)?;
        // Intervals built in code bypass `RuleInterval::new`.
        RuleInterval::new(self.born.lo, self.born.hi)?;
        RuleInterval::new(self.survive.lo, self.survive.hi)?;
        Ok(())
    }

    pub fn rules(&self) -> RuleSet {
        RuleSet {
            born: self.born,
            survive: self.survive,
            mode: LifeMode::from_boolean_life(self.boolean_life),
            increment_scale: self.increment_scale,
        }
    }
}

pub(crate) fn validate_dimensions(columns: usize, rows: usize) -> Result<(), ConfigError> {
    if columns == 0 || rows == 0 {
        return Err(ConfigError::ZeroDimension { columns, rows });
    }
    Ok(())
}

pub(crate) fn validate_increment_scale(scale: f64) -> Result<(), ConfigError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ConfigError::InvalidIncrementScale(scale));
    }
    Ok(())
}
