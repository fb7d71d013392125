// The automaton grid: owns every cell, applies the rules, exposes readout.
//
// A `Grid` pairs a `Lattice` of cells with a `RuleSet` and an injected
// `UnitSource` (a `CellRng` in production, a `ScriptedSource` in tests).
//
// `step()` is strictly two-phase:
// 1. Compute: for every active cell, aggregate its Moore neighbors and run
//    `rules::next_value`, staging the result with `Cell::set_pending`. All
//    reads in this pass see the previous generation.
// 2. Commit: promote every pending value, deriving `just_born`.
// The passes never interleave: no cell sees a neighbor's updated value
// within one generation. `step()` takes `&mut self`,
// so no readout or manual edit can land between the two passes.
//
// Manual edits (`set_cell_value`, `clear`, `randomize`) skip the rule engine
// but still go through pending → commit so the birth flag stays correct for
// rendering.
//
// Readout order is column-major (outer columns, inner rows) and stable for
// identical state. That order is the contract with the output sink: index
// `i` always means cell `(i / rows, i % rows)`.
//
// See also: `rules.rs` for the transition function, `lattice.rs` for
// storage and neighbor iteration, `controller.rs` for the host glue that
// calls `step()` once per tick.

use crate::cell::Cell;
use crate::config::{AutomatonConfig, validate_dimensions, validate_increment_scale};
use crate::error::ConfigError;
use crate::lattice::Lattice;
use crate::render::RenderCell;
use crate::rules::{self, LifeMode, NeighborStats, RuleInterval, RuleSet, UnitSource};
use memo_prng::CellRng;
use tracing::{debug, trace, warn};

/// Outcome counts for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepSummary {
    /// Cells that went from 0 to a positive value.
    pub births: usize,
    /// Cells that went from a positive value to 0.
    pub deaths: usize,
    /// Cells with a positive value after the step.
    pub active: usize,
}

#[derive(Debug, Clone)]
pub struct Grid<R = CellRng> {
    lattice: Lattice,
    rules: RuleSet,
    rng: R,
    generation: u64,
}

impl Grid<CellRng> {
    /// Build a grid from a validated config, seeding births from
    /// `config.seed`.
    pub fn from_config(config: &AutomatonConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, CellRng::new(config.seed))
    }
}

impl<R: UnitSource> Grid<R> {
    /// Build a grid from a config with a caller-supplied random source.
    pub fn with_source(config: &AutomatonConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.columns, config.rows, config.rules(), rng)
    }

    pub fn new(columns: usize, rows: usize, rules: RuleSet, rng: R) -> Result<Self, ConfigError> {
        validate_dimensions(columns, rows)?;
        validate_increment_scale(rules.increment_scale)?;
        Ok(Grid {
            lattice: Lattice::new(columns, rows),
            rules,
            rng,
            generation: 0,
        })
    }

    pub fn columns(&self) -> usize {
        self.lattice.columns()
    }

    pub fn rows(&self) -> usize {
        self.lattice.rows()
    }

    pub fn len(&self) -> usize {
        self.lattice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lattice.is_empty()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Number of completed `step()` calls.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.lattice.get(col, row)
    }

    /// Active-neighbor count and value sum over the in-bounds Moore
    /// neighborhood. Out-of-range coordinates have no neighbors.
    pub fn neighbor_stats(&self, col: usize, row: usize) -> NeighborStats {
        self.lattice
            .neighbors(col, row)
            .fold(NeighborStats::default(), |mut acc, cell| {
                if cell.is_active() {
                    acc.active += 1;
                }
                acc.sum += cell.value();
                acc
            })
    }

    /// Advance one generation.
    pub fn step(&mut self) -> StepSummary {
        let columns = self.columns();
        let rows = self.rows();

        // Compute pass: reads only committed values.
        let mut next = Vec::with_capacity(self.len());
        for col in 0..columns {
            for row in 0..rows {
                let stats = self.neighbor_stats(col, row);
                let value = self.lattice.get(col, row).map_or(0.0, Cell::value);
                next.push(rules::next_value(value, stats, &self.rules, &mut self.rng));
            }
        }

        let mut summary = StepSummary::default();
        for (cell, &v) in self.lattice.iter_mut().zip(&next) {
            if cell.is_active() && v == 0.0 {
                summary.deaths += 1;
            }
            cell.set_pending(v);
        }

        // Commit pass.
        for cell in self.lattice.iter_mut() {
            cell.commit();
            if cell.just_born() {
                summary.births += 1;
            }
            if cell.is_active() {
                summary.active += 1;
            }
        }

        self.generation += 1;
        trace!(
            generation = self.generation,
            births = summary.births,
            deaths = summary.deaths,
            active = summary.active,
            "step"
        );
        summary
    }

    /// Change the active dimensions. Storage grows when needed and is never
    /// released, so shrinking and growing back restores the hidden cells.
    pub fn resize(&mut self, columns: usize, rows: usize) -> Result<(), ConfigError> {
        validate_dimensions(columns, rows)?;
        debug!(
            from_columns = self.columns(),
            from_rows = self.rows(),
            columns,
            rows,
            "resize grid"
        );
        self.lattice.resize(columns, rows);
        let (capacity_columns, capacity_rows) = self.lattice.capacity();
        trace!(capacity_columns, capacity_rows, "lattice storage");
        Ok(())
    }

    pub fn set_born_rule(&mut self, born: RuleInterval) {
        debug!(lo = born.lo, hi = born.hi, "born rule");
        self.rules.born = born;
    }

    pub fn set_survive_rule(&mut self, survive: RuleInterval) {
        debug!(lo = survive.lo, hi = survive.hi, "survive rule");
        self.rules.survive = survive;
    }

    pub fn set_mode(&mut self, mode: LifeMode) {
        debug!(?mode, "life mode");
        self.rules.mode = mode;
    }

    pub fn set_boolean_life(&mut self, on: bool) {
        self.set_mode(LifeMode::from_boolean_life(on));
    }

    pub fn set_increment_scale(&mut self, scale: f64) -> Result<(), ConfigError> {
        validate_increment_scale(scale)?;
        debug!(scale, "increment scale");
        self.rules.increment_scale = scale;
        Ok(())
    }

    /// All active cell values, column-major, length `columns × rows`.
    pub fn read_values(&self) -> Vec<f64> {
        self.lattice.iter().map(Cell::value).collect()
    }

    /// Per-cell snapshot for a drawing backend, in readout order.
    pub fn render_cells(&self) -> impl Iterator<Item = RenderCell> + '_ {
        self.lattice.iter().map(|cell| RenderCell {
            col: cell.col(),
            row: cell.row(),
            value: cell.value(),
            just_born: cell.just_born(),
        })
    }

    /// Write one cell directly, bypassing the rules. Values outside [0, 1]
    /// are clamped.
    pub fn set_cell_value(&mut self, col: usize, row: usize, value: f64) -> Result<(), ConfigError> {
        if value.is_nan() {
            return Err(ConfigError::NonFiniteCellValue(value));
        }
        let (columns, rows) = (self.columns(), self.rows());
        let cell = self
            .lattice
            .get_mut(col, row)
            .ok_or(ConfigError::CellOutOfRange {
                col,
                row,
                columns,
                rows,
            })?;
        let clamped = value.clamp(0.0, 1.0);
        if clamped != value {
            warn!(col, row, value, "cell value clamped into [0, 1]");
        }
        cell.set_pending(clamped);
        cell.commit();
        Ok(())
    }

    /// Kill every active cell.
    pub fn clear(&mut self) {
        for cell in self.lattice.iter_mut() {
            cell.set_pending(0.0);
        }
        for cell in self.lattice.iter_mut() {
            cell.commit();
        }
    }

    /// Give each active cell, with probability `density`, a fresh random
    /// value; the rest are set to 0.
    pub fn randomize(&mut self, density: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(ConfigError::InvalidDensity(density));
        }
        for cell in self.lattice.iter_mut() {
            let v = if self.rng.chance(density) {
                self.rng.next_unit()
            } else {
                0.0
            };
            cell.set_pending(v);
        }
        for cell in self.lattice.iter_mut() {
            cell.commit();
        }
        debug!(density, "randomized grid");
        Ok(())
    }
}
