// Value → pitch mapping for the automaton's readout.
//
// Turns a frame of [0, 1] cell values into frequencies in Hz:
// 1. Values at or below `SILENCE_THRESHOLD` are silent and map to 0.
// 2. Scale onto a pitch range in MIDI-note units:
//    `p = v * octave_range.span + octave_range.offset`.
// 3. Unless quantization is `Off`, snap to the nearest semitone. `Scale`
//    additionally folds the chromatic step onto a seven-step scale with
//    `(p * 0.5826 * 12) / 7 + tonic`. That fold is an approximation that
//    deliberately biases the result by `tonic`; it is not an exact modal map.
// 4. Equal-tempered conversion, A4 = 440 Hz at note 69.
// 5. Clamp to the audible band [20, 13000] Hz.
//
// `quantize` is pure and returns a new vector; `quantize_in_place` rewrites a
// buffer for the controller's per-tick path.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Values at or below this are treated as "off".
pub const SILENCE_THRESHOLD: f64 = 0.0001;
pub const MIN_FREQUENCY: f64 = 20.0;
pub const MAX_FREQUENCY: f64 = 13000.0;

/// Stretch factor for folding 12 chromatic steps onto a 7-step scale.
const SCALE_FOLD: f64 = 0.5826;

/// How (and whether) scaled values are snapped to pitches.
///
/// Serialized as the host's integer code: -1 off, >0 scale, anything else
/// chromatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Quantization {
    /// Continuous pitch, no rounding.
    #[default]
    Off,
    /// Round to the nearest semitone.
    Chromatic,
    /// Round, then fold onto a seven-step scale offset by the tonic.
    Scale,
}

impl Quantization {
    /// Only -1 disables quantization; other non-positive codes round.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Quantization::Off,
            c if c > 0 => Quantization::Scale,
            _ => Quantization::Chromatic,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Quantization::Off => -1,
            Quantization::Chromatic => 0,
            Quantization::Scale => 1,
        }
    }
}

impl From<i32> for Quantization {
    fn from(code: i32) -> Self {
        Quantization::from_code(code)
    }
}

impl From<Quantization> for i32 {
    fn from(q: Quantization) -> Self {
        q.code()
    }
}

/// Pitch window in MIDI-note units: `[offset, offset + span]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OctaveRange {
    pub offset: f64,
    pub span: f64,
}

impl Default for OctaveRange {
    /// The full MIDI range.
    fn default() -> Self {
        OctaveRange {
            offset: 0.0,
            span: 127.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizeParams {
    /// Added after the scale fold; ignored in other modes.
    pub tonic: f64,
    pub mode: Quantization,
    pub octave_range: OctaveRange,
}

impl QuantizeParams {
    /// Reject non-finite tonic, offset or span. A NaN here would survive
    /// the final clamp and reach the sink.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tonic", self.tonic),
            ("octave offset", self.octave_range.offset),
            ("octave span", self.octave_range.span),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteQuantizeParam { field, value });
            }
        }
        Ok(())
    }
}

/// Equal-tempered MIDI note → Hz (A4 = 440 Hz at note 69).
pub fn midi_to_frequency(note: f64) -> f64 {
    2f64.powf((note - 69.0) / 12.0) * 440.0
}

/// Hz → fractional MIDI note. Non-positive input maps to negative infinity.
pub fn frequency_to_midi(freq: f64) -> f64 {
    69.0 + 12.0 * (freq / 440.0).log2()
}

/// Map a single cell value to a frequency, or 0 for silence.
pub fn quantize_value(v: f64, params: &QuantizeParams) -> f64 {
    if v.is_nan() || v <= SILENCE_THRESHOLD {
        return 0.0;
    }
    let mut pitch = v * params.octave_range.span + params.octave_range.offset;
    if params.mode != Quantization::Off {
        pitch = pitch.round();
        if params.mode == Quantization::Scale {
            pitch = (pitch * SCALE_FOLD * 12.0) / 7.0 + params.tonic;
        }
    }
    midi_to_frequency(pitch).clamp(MIN_FREQUENCY, MAX_FREQUENCY)
}

pub fn quantize(values: &[f64], params: &QuantizeParams) -> Vec<f64> {
    values.iter().map(|&v| quantize_value(v, params)).collect()
}

pub fn quantize_in_place(values: &mut [f64], params: &QuantizeParams) {
    for v in values.iter_mut() {
        *v = quantize_value(*v, params);
    }
}
