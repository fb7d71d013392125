// Host glue: drives a `Grid` the way the instrument's host patch does.
//
// The host calls `bang()` once per frame. When the automaton is running the
// grid advances one generation; either way the current readout is emitted,
// so a paused grid still reports edits. Every other host message maps to a
// method here:
//
//   bang                    → bang()
//   set_run v               → set_running(v)
//   set_step n              → set_step(n)          (playhead highlight)
//   dim c r                 → set_dimensions(c, r) (emits)
//   born lo hi              → set_born_rule(..)
//   survive lo hi           → set_survive_rule(..)
//   booleanLife v           → set_boolean_life(v)
//   increment v             → set_increment_scale(v)
//   click / drag (x, y, …)  → click(..) / drag(..) (emits)
//
// Pointer edits write 0 when shift is held and a random value otherwise.
// They draw from a generator forked off the config seed, so editing never
// shifts the grid's own birth stream.
//
// Emission reads the grid column-major, quantizes when `QuantizeParams` is
// set, and hands a `Frame` to the sink. A multi-threaded host should wrap
// the whole controller in a `Mutex`; `bang()` needs `&mut self`, so a step
// can never be observed half-committed.

use crate::config::AutomatonConfig;
use crate::error::{ConfigError, SinkError};
use crate::grid::{Grid, StepSummary};
use crate::quantize::{QuantizeParams, quantize_in_place};
use crate::render::{cell_at_point, playhead_cell};
use crate::rules::{RuleInterval, UnitSource};
use crate::sink::{Frame, OutputSink};
use memo_prng::CellRng;
use thiserror::Error;
use tracing::trace;

/// Anything a host message can fail with.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// A pointer event in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    /// View size the coordinates refer to.
    pub width: f64,
    pub height: f64,
    pub shift: bool,
}

pub struct Controller<S, R = CellRng> {
    grid: Grid<R>,
    sink: S,
    running: bool,
    step: usize,
    quantize: Option<QuantizeParams>,
    pointer_rng: CellRng,
}

impl<S: OutputSink> Controller<S, CellRng> {
    /// Build a grid from `config` and attach `sink`. Starts paused.
    pub fn from_config(config: &AutomatonConfig, sink: S) -> Result<Self, ConfigError> {
        let mut seed_rng = CellRng::new(config.seed);
        let pointer_rng = seed_rng.fork();
        let grid = Grid::from_config(config)?;
        Ok(Self::new(grid, sink, pointer_rng))
    }
}

impl<S: OutputSink, R: UnitSource> Controller<S, R> {
    pub fn new(grid: Grid<R>, sink: S, pointer_rng: CellRng) -> Self {
        Controller {
            grid,
            sink,
            running: false,
            step: 0,
            quantize: None,
            pointer_rng,
        }
    }

    pub fn grid(&self) -> &Grid<R> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid<R> {
        &mut self.grid
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Emit frequencies instead of raw values. `None` restores raw output.
    pub fn set_quantize(&mut self, params: Option<QuantizeParams>) -> Result<(), ControlError> {
        if let Some(params) = &params {
            params.validate()?;
        }
        self.quantize = params;
        Ok(())
    }

    /// One host frame: advance if running, then emit.
    pub fn bang(&mut self) -> Result<Option<StepSummary>, ControlError> {
        let summary = self.running.then(|| self.grid.step());
        self.emit()?;
        Ok(summary)
    }

    /// Move the playhead highlight. Wraps over the cell count.
    pub fn set_step(&mut self, step: usize) {
        self.step = step;
    }

    pub fn playhead(&self) -> (usize, usize) {
        playhead_cell(self.step, self.grid.columns(), self.grid.rows())
    }

    pub fn set_dimensions(&mut self, columns: usize, rows: usize) -> Result<(), ControlError> {
        self.grid.resize(columns, rows)?;
        self.emit()
    }

    pub fn set_born_rule(&mut self, lo: f64, hi: f64) -> Result<(), ControlError> {
        self.grid.set_born_rule(RuleInterval::new(lo, hi)?);
        Ok(())
    }

    pub fn set_survive_rule(&mut self, lo: f64, hi: f64) -> Result<(), ControlError> {
        self.grid.set_survive_rule(RuleInterval::new(lo, hi)?);
        Ok(())
    }

    pub fn set_boolean_life(&mut self, on: bool) {
        self.grid.set_boolean_life(on);
    }

    pub fn set_increment_scale(&mut self, scale: f64) -> Result<(), ControlError> {
        self.grid.set_increment_scale(scale)?;
        Ok(())
    }

    /// Set the cell under the pointer: cleared with shift, randomized
    /// otherwise. Returns the edited coordinate.
    pub fn click(&mut self, pointer: Pointer) -> Result<(usize, usize), ControlError> {
        let (col, row) = cell_at_point(
            pointer.x,
            pointer.y,
            pointer.width,
            pointer.height,
            self.grid.columns(),
            self.grid.rows(),
        );
        let value = if pointer.shift {
            0.0
        } else {
            self.pointer_rng.next_f64()
        };
        self.grid.set_cell_value(col, row, value)?;
        self.emit()?;
        Ok((col, row))
    }

    /// Drag with `button_down == false` is the release event and does nothing.
    pub fn drag(
        &mut self,
        pointer: Pointer,
        button_down: bool,
    ) -> Result<Option<(usize, usize)>, ControlError> {
        if !button_down {
            return Ok(None);
        }
        self.click(pointer).map(Some)
    }

    /// Flush buffering sinks. Call once when the host shuts down.
    pub fn finish(&mut self) -> Result<(), ControlError> {
        self.sink.finish()?;
        Ok(())
    }

    fn emit(&mut self) -> Result<(), ControlError> {
        let mut values = self.grid.read_values();
        if let Some(params) = &self.quantize {
            quantize_in_place(&mut values, params);
        }
        let frame = Frame {
            tick: self.grid.generation(),
            values,
        };
        trace!(tick = frame.tick, len = frame.values.len(), "emit frame");
        self.sink.emit(&frame)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::Quantization;
    use crate::rules::{RuleSet, ScriptedSource};
    use crate::sink::VecSink;

    fn controller(columns: usize, rows: usize) -> Controller<VecSink> {
        let config = AutomatonConfig {
            columns,
            rows,
            seed: 11,
            ..AutomatonConfig::default()
        };
        Controller::from_config(&config, VecSink::new()).unwrap()
    }

    fn at(x: f64, y: f64, shift: bool) -> Pointer {
        Pointer {
            x,
            y,
            width: 100.0,
            height: 100.0,
            shift,
        }
    }

    #[test]
    fn paused_bang_emits_without_stepping() {
        let mut c = controller(4, 4);
        assert!(!c.is_running());
        assert_eq!(c.bang().unwrap(), None);
        assert_eq!(c.grid().generation(), 0);
        assert_eq!(c.sink().frames.len(), 1);
        assert_eq!(c.sink().frames[0].values.len(), 16);
    }

    #[test]
    fn running_bang_steps_then_emits() {
        let mut c = controller(4, 4);
        c.set_running(true);
        assert!(c.bang().unwrap().is_some());
        assert_eq!(c.grid().generation(), 1);
        assert_eq!(c.sink().last().unwrap().tick, 1);
    }

    #[test]
    fn click_sets_random_value_and_shift_clears() {
        let mut c = controller(4, 4);
        let (col, row) = c.click(at(10.0, 90.0, false)).unwrap();
        assert_eq!((col, row), (0, 0));
        let v = c.grid().cell(0, 0).unwrap().value();
        assert!(v > 0.0 && v < 1.0);
        assert!(c.grid().cell(0, 0).unwrap().just_born());

        c.click(at(10.0, 90.0, true)).unwrap();
        assert_eq!(c.grid().cell(0, 0).unwrap().value(), 0.0);
        assert_eq!(c.sink().frames.len(), 2);
    }

    #[test]
    fn drag_release_is_ignored() {
        let mut c = controller(4, 4);
        assert_eq!(c.drag(at(50.0, 50.0, false), false).unwrap(), None);
        assert!(c.sink().frames.is_empty());
        assert_eq!(c.drag(at(50.0, 50.0, false), true).unwrap(), Some((2, 2)));
    }

    #[test]
    fn pointer_edits_do_not_consume_birth_stream() {
        let config = AutomatonConfig {
            seed: 5,
            ..AutomatonConfig::default()
        };
        let mut edited = Controller::from_config(&config, VecSink::new()).unwrap();
        let mut plain = Controller::from_config(&config, VecSink::new()).unwrap();
        edited.click(at(10.0, 90.0, false)).unwrap();
        edited.click(at(10.0, 90.0, true)).unwrap();
        edited.grid_mut().randomize(0.5).unwrap();
        plain.grid_mut().randomize(0.5).unwrap();
        assert_eq!(edited.grid().read_values(), plain.grid().read_values());
    }

    #[test]
    fn dimensions_change_emits_new_length() {
        let mut c = controller(2, 2);
        c.set_dimensions(3, 5).unwrap();
        assert_eq!(c.sink().last().unwrap().values.len(), 15);
        assert!(c.set_dimensions(0, 5).is_err());
    }

    #[test]
    fn quantized_emission() {
        let grid = Grid::new(1, 1, RuleSet::default(), ScriptedSource::default()).unwrap();
        let mut c = Controller::new(grid, VecSink::new(), CellRng::new(0));
        c.grid_mut().set_cell_value(0, 0, 0.5).unwrap();
        c.set_quantize(Some(QuantizeParams {
            mode: Quantization::Chromatic,
            ..QuantizeParams::default()
        }))
        .unwrap();
        c.bang().unwrap();
        let f = c.sink().last().unwrap().values[0];
        assert!((f - 329.6276).abs() < 1e-3, "E4 expected, got {f}");
    }

    #[test]
    fn nan_tonic_is_refused_and_output_stays_raw() {
        let mut c = controller(2, 2);
        let bad = QuantizeParams {
            tonic: f64::NAN,
            mode: Quantization::Scale,
            ..QuantizeParams::default()
        };
        assert!(matches!(
            c.set_quantize(Some(bad)),
            Err(ControlError::Config(ConfigError::NonFiniteQuantizeParam { field: "tonic", .. }))
        ));
        c.grid_mut().set_cell_value(1, 1, 0.5).unwrap();
        c.bang().unwrap();
        assert!(c.sink().last().unwrap().values.iter().all(|v| v.is_finite()));
        assert_eq!(c.sink().last().unwrap().values[3], 0.5);
    }

    #[test]
    fn playhead_follows_readout_order() {
        let mut c = controller(3, 2);
        c.set_step(3);
        assert_eq!(c.playhead(), (1, 1));
        c.set_step(6);
        assert_eq!(c.playhead(), (0, 0));
    }

    #[test]
    fn rule_setters_validate() {
        let mut c = controller(2, 2);
        assert!(c.set_born_rule(f64::NAN, 3.0).is_err());
        c.set_born_rule(3.0, 3.0).unwrap();
        c.set_survive_rule(1.0, 4.0).unwrap();
        c.set_boolean_life(true);
        assert!(c.set_increment_scale(-1.0).is_err());
        let rules = c.grid().rules();
        assert_eq!(rules.born, RuleInterval { lo: 3.0, hi: 3.0 });
        assert_eq!(rules.survive, RuleInterval { lo: 1.0, hi: 4.0 });
        assert!(rules.mode.is_boolean());
    }
}
