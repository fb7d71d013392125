// MEMO Automata: a continuous-valued cellular automaton for improvisation.
//
// Cells carry values in [0, 1] instead of plain on/off. One rule set drives
// either classical birth/survival ("boolean life") or a continuous mode in
// which live cells grow or decay with their neighborhood's mean activity.
// Each tick the grid is read out column-major as a flat list of values,
// optionally quantized to frequencies, and handed to an output sink.
//
// Architecture:
// - cell.rs: Cell with a pending/commit two-phase update and birth flag
// - lattice.rs: Dense column-major cell storage, grow-only resize, Moore
//   neighbor iteration with hard edges
// - rules.rs: RuleSet, NeighborStats, the pure `next_value` transition, and
//   the injectable `UnitSource` for birth values
// - grid.rs: Grid with the two-phase step, setters, readout, manual edits
// - quantize.rs: Value → frequency mapping (chromatic / scale fold / MTOF)
// - config.rs: JSON-loadable AutomatonConfig with validation
// - error.rs: ConfigError and SinkError
// - render.rs: RenderCell snapshots, pointer → cell mapping, playhead cell
// - sink.rs: Frame + OutputSink trait, in-memory and JSON-lines sinks
// - midi.rs: MidiRecorder sink writing Standard MIDI Files
// - controller.rs: Host glue for bang, run flag, pointer edits, emission
//
// Given a seed, every run is reproducible: births draw from a seeded
// xoshiro256++ generator (`memo_prng`), never from ambient entropy.

pub mod cell;
pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod lattice;
pub mod midi;
pub mod quantize;
pub mod render;
pub mod rules;
pub mod sink;

pub use memo_prng as prng;
