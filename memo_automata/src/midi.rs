// MIDI recording of the automaton's output stream.
//
// `MidiRecorder` is an `OutputSink` that turns each frame into a chord on an
// eighth-note grid: every sounding cell becomes a MIDI note, identical notes
// are merged, and a note that sounds in consecutive frames is held rather
// than re-attacked. `finish()` writes a Standard MIDI File (format 1: tempo
// track + one note track) when a path was given.
//
// Frames are expected to carry frequencies (the controller's quantized
// output). A recorder built with `quantizing(params)` accepts raw [0, 1]
// cell values instead and runs them through `quantize` first.
//
// Uses the `midly` crate for encoding. This records the *output stream*
// only; it is not a save format for grid state.

use crate::error::{ConfigError, SinkError};
use crate::quantize::{QuantizeParams, frequency_to_midi, quantize};
use crate::sink::{Frame, OutputSink};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// One frame lasts an eighth note.
const TICKS_PER_FRAME: u64 = TICKS_PER_QUARTER as u64 / 2;

const NOTE_VELOCITY: u8 = 80;

/// General MIDI "Pad 1 (new age)".
const PROGRAM: u8 = 88;

/// Slowest tempo whose quarter-note length still fits a 24-bit tempo event.
const MIN_TEMPO_BPM: u16 = 4;

/// Largest delta-time a track event can carry (28 bits).
const MAX_DELTA: u64 = (1 << 28) - 1;

#[derive(Debug, Clone)]
pub struct MidiRecorder {
    tempo_bpm: u16,
    path: Option<PathBuf>,
    quantize: Option<QuantizeParams>,
    /// Sounding notes per frame, in emission order.
    chords: Vec<BTreeSet<u8>>,
}

impl MidiRecorder {
    pub fn new(tempo_bpm: u16) -> Self {
        MidiRecorder {
            tempo_bpm: tempo_bpm.max(MIN_TEMPO_BPM),
            path: None,
            quantize: None,
            chords: Vec::new(),
        }
    }

    /// Write the file to `path` on `finish()`.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Treat incoming frames as raw cell values and quantize them first.
    pub fn quantizing(mut self, params: QuantizeParams) -> Result<Self, ConfigError> {
        params.validate()?;
        self.quantize = Some(params);
        Ok(self)
    }

    pub fn frames(&self) -> usize {
        self.chords.len()
    }

    /// Notes recorded for frame `i`.
    pub fn chord(&self, i: usize) -> Option<&BTreeSet<u8>> {
        self.chords.get(i)
    }

    /// Encode everything recorded so far as SMF bytes.
    pub fn encode(&self) -> Result<Vec<u8>, SinkError> {
        let smf = self.to_smf()?;
        let mut buf = Vec::new();
        smf.write(&mut buf)
            .map_err(|e| SinkError::Midi(e.to_string()))?;
        Ok(buf)
    }

    pub fn write(&self, path: &Path) -> Result<(), SinkError> {
        let bytes = self.encode()?;
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), frames = self.chords.len(), "wrote MIDI");
        Ok(())
    }

    fn to_smf(&self) -> Result<Smf<'static>, SinkError> {
        let mut smf = Smf::new(Header::new(
            Format::Parallel,
            Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
        ));

        // At MIN_TEMPO_BPM or above this is at most 15_000_000, inside u24.
        let tempo_microseconds = 60_000_000 / u32::from(self.tempo_bpm);
        smf.tracks.push(vec![
            meta(0, MetaMessage::Tempo(u24::new(tempo_microseconds))),
            meta(0, MetaMessage::EndOfTrack),
        ]);

        let mut track: Track<'static> = vec![
            meta(0, MetaMessage::TrackName(b"Automaton")),
            midi(0, MidiMessage::ProgramChange { program: u7::new(PROGRAM) }),
        ];

        let empty = BTreeSet::new();
        let mut last_event_tick = 0u64;
        let mut sounding = &empty;

        for (i, chord) in self.chords.iter().enumerate() {
            let frame_tick = i as u64 * TICKS_PER_FRAME;
            for &key in sounding.difference(chord) {
                track.push(note_off(delta(last_event_tick, frame_tick)?, key));
                last_event_tick = frame_tick;
            }
            for &key in chord.difference(sounding) {
                track.push(note_on(delta(last_event_tick, frame_tick)?, key));
                last_event_tick = frame_tick;
            }
            sounding = chord;
        }

        let end_tick = self.chords.len() as u64 * TICKS_PER_FRAME;
        for &key in sounding {
            track.push(note_off(delta(last_event_tick, end_tick)?, key));
            last_event_tick = end_tick;
        }
        track.push(meta(0, MetaMessage::EndOfTrack));
        smf.tracks.push(track);
        Ok(smf)
    }
}

/// Delta-time between two absolute ticks, or an error when a gap is too long
/// for one event.
fn delta(from: u64, to: u64) -> Result<u32, SinkError> {
    let gap = to.saturating_sub(from);
    if gap > MAX_DELTA {
        return Err(SinkError::Midi(format!(
            "gap of {gap} ticks between notes exceeds the MIDI delta limit"
        )));
    }
    Ok(gap as u32)
}

impl OutputSink for MidiRecorder {
    fn emit(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let freqs = match &self.quantize {
            Some(params) => quantize(&frame.values, params),
            None => frame.values.clone(),
        };
        let chord = freqs
            .iter()
            .filter(|f| **f > 0.0)
            .map(|&f| frequency_to_midi(f).round().clamp(0.0, 127.0) as u8)
            .collect();
        self.chords.push(chord);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        match &self.path {
            Some(path) => self.write(path),
            None => Ok(()),
        }
    }
}

fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}

fn midi(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message,
        },
    }
}

fn note_on(delta: u32, key: u8) -> TrackEvent<'static> {
    midi(
        delta,
        MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(NOTE_VELOCITY),
        },
    )
}

fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
    midi(
        delta,
        MidiMessage::NoteOff {
            key: u7::new(key),
            vel: u7::new(0),
        },
    )
}
