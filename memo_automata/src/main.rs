// Headless CLI runner for MEMO Automata.
//
// Builds a grid from a JSON config (or defaults), applies command-line
// overrides, seeds it, and plays the host's role for N ticks: running
// `bang()` each tick and streaming frames to the selected sinks.
//
// Usage:
//   cargo run -p memo_automata -- [--config FILE] [--steps N] [--seed N]
//     [--columns C] [--rows R] [--boolean-life] [--density D]
//     [--quantize-mode M] [--tonic T] [--octave-offset O] [--octave-span S]
//     [--jsonl FILE] [--midi FILE] [--tempo BPM]
//
// Log verbosity follows RUST_LOG (default "info"); use RUST_LOG=trace to see
// every step and frame.

use anyhow::{Context, Result};
use clap::Parser;
use memo_automata::config::AutomatonConfig;
use memo_automata::controller::Controller;
use memo_automata::midi::MidiRecorder;
use memo_automata::quantize::{OctaveRange, Quantization, QuantizeParams};
use memo_automata::sink::{JsonLinesSink, SinkSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "automata", about = "Run the MEMO cellular automaton headless")]
struct Args {
    /// JSON config file; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of host ticks to run.
    #[arg(long, default_value_t = 64)]
    steps: u64,

    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    columns: Option<usize>,

    #[arg(long)]
    rows: Option<usize>,

    /// Use discrete on/off rules instead of continuous growth/decay.
    #[arg(long)]
    boolean_life: bool,

    /// Fraction of cells seeded with a random value before the first tick.
    #[arg(long, default_value_t = 0.3)]
    density: f64,

    /// Emit frequencies: -1 unrounded, 0 chromatic, >0 scale fold.
    #[arg(long, allow_hyphen_values = true)]
    quantize_mode: Option<i32>,

    #[arg(long, default_value_t = 0.0)]
    tonic: f64,

    #[arg(long, default_value_t = 36.0, allow_hyphen_values = true)]
    octave_offset: f64,

    #[arg(long, default_value_t = 48.0)]
    octave_span: f64,

    /// Write one JSON frame per line.
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Record the pitch stream as a Standard MIDI File.
    #[arg(long)]
    midi: Option<PathBuf>,

    #[arg(long, default_value_t = 120)]
    tempo: u16,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let range = OctaveRange {
        offset: args.octave_offset,
        span: args.octave_span,
    };
    let quantize = args.quantize_mode.map(|code| QuantizeParams {
        tonic: args.tonic,
        mode: Quantization::from_code(code),
        octave_range: range,
    });
    QuantizeParams {
        tonic: args.tonic,
        mode: Quantization::Chromatic,
        octave_range: range,
    }
    .validate()
    .context("invalid quantizer settings")?;

    let mut sinks = SinkSet::new();
    if let Some(path) = &args.jsonl {
        let file = File::create(path)
            .with_context(|| format!("creating frame log {}", path.display()))?;
        sinks.push(Box::new(JsonLinesSink::new(BufWriter::new(file))));
    }
    if let Some(path) = &args.midi {
        // The recorder needs pitches; fall back to chromatic over the
        // requested range when the frames themselves are raw values.
        let recorder = MidiRecorder::new(args.tempo).with_path(path);
        let recorder = match quantize {
            Some(_) => recorder,
            None => recorder.quantizing(QuantizeParams {
                tonic: args.tonic,
                mode: Quantization::Chromatic,
                octave_range: range,
            })?,
        };
        sinks.push(Box::new(recorder));
    }

    println!("=== MEMO Automata ===");
    println!("Grid: {}x{}", config.columns, config.rows);
    println!(
        "Rules: born {:?}, survive {:?}, {}",
        [config.born.lo, config.born.hi],
        [config.survive.lo, config.survive.hi],
        if config.boolean_life { "boolean life" } else { "continuous" }
    );
    println!("Increment scale: {}", config.increment_scale);
    println!("Seed: {}", config.seed);
    println!("Steps: {}", args.steps);
    println!();

    let mut controller = Controller::from_config(&config, sinks)?;
    controller.set_quantize(quantize)?;
    controller
        .grid_mut()
        .randomize(args.density)
        .context("seeding the grid")?;
    controller.set_running(true);

    let mut births = 0;
    let mut deaths = 0;
    let mut last_active = 0;
    for tick in 0..args.steps {
        controller.set_step(tick as usize);
        if let Some(summary) = controller.bang()? {
            births += summary.births;
            deaths += summary.deaths;
            last_active = summary.active;
        }
    }
    controller.finish()?;
    info!(steps = args.steps, births, deaths, "run complete");

    let cells = controller.grid().len();
    println!("Births: {births}, deaths: {deaths}");
    println!(
        "Active at end: {last_active}/{cells} ({:.1}%)",
        last_active as f64 / cells as f64 * 100.0
    );
    if let Some(path) = &args.jsonl {
        println!("Frames written to {}", path.display());
    }
    if let Some(path) = &args.midi {
        println!("MIDI written to {}", path.display());
    }
    Ok(())
}

/// Read the config file if given, then layer CLI overrides on top.
fn load_config(args: &Args) -> Result<AutomatonConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AutomatonConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AutomatonConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(columns) = args.columns {
        config.columns = columns;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if args.boolean_life {
        config.boolean_life = true;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}
