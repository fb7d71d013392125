// Error types for the automaton library.
//
// The engine itself has no fallible I/O: stepping, neighbor lookups and
// quantization are pure arithmetic and never fail. Errors come from two
// boundaries only:
// - `ConfigError`: rejected configuration at constructors and setters
//   (zero dimensions, non-positive increment scale, NaN rule bounds or cell
//   values or quantizer parameters, cell coordinates outside the active
//   region). Rejecting these up
//   front keeps NaNs from leaking into the grid.
// - `SinkError`: failures while handing readout frames to an output sink
//   (file I/O, JSON encoding, MIDI encoding).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be at least 1x1, got {columns}x{rows}")]
    ZeroDimension { columns: usize, rows: usize },

    #[error("increment scale must be finite and > 0, got {0}")]
    InvalidIncrementScale(f64),

    #[error("rule bound must be finite, got [{lo}, {hi}]")]
    NonFiniteRuleBound { lo: f64, hi: f64 },

    #[error("cell ({col}, {row}) is outside the {columns}x{rows} grid")]
    CellOutOfRange {
        col: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },

    #[error("cell value must be a number, got {0}")]
    NonFiniteCellValue(f64),

    #[error("quantizer {field} must be finite, got {value}")]
    NonFiniteQuantizeParam { field: &'static str, value: f64 },

    #[error("density must be within [0, 1], got {0}")]
    InvalidDensity(f64),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MIDI encoding failed: {0}")]
    Midi(String),
}
