// Output sinks: where readout frames go.
//
// After every tick and every manual edit, the controller reads the grid
// (optionally quantized to frequencies) and hands the result to an
// `OutputSink` as a `Frame`. The sink decides what "output" means:
// - `VecSink`: keep frames in memory (tests, embedding hosts).
// - `JsonLinesSink`: one JSON object per line on any `Write`.
// - `MidiRecorder` (see `midi.rs`): accumulate notes, write an SMF on finish.
// - `SinkSet`: fan a frame out to several boxed sinks.
//
// `finish()` is called once when the host is done, for sinks that buffer.

use crate::error::SinkError;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One emitted readout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Grid generation at emission time.
    pub tick: u64,
    /// Column-major cell values, or frequencies when quantized.
    pub values: Vec<f64>,
}

pub trait OutputSink {
    fn emit(&mut self, frame: &Frame) -> Result<(), SinkError>;

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn emit(&mut self, frame: &Frame) -> Result<(), SinkError> {
        (**self).emit(frame)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VecSink {
    pub frames: Vec<Frame>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl OutputSink for VecSink {
    fn emit(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Writes each frame as a single line of JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for JsonLinesSink<W> {
    fn emit(&mut self, frame: &Frame) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, frame)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Broadcasts every frame to each member, in order. Stops at the first error.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn OutputSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn OutputSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl OutputSink for SinkSet {
    fn emit(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.sinks.iter_mut().try_for_each(|s| s.emit(frame))
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.sinks.iter_mut().try_for_each(|s| s.finish())
    }
}
