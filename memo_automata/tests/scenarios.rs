// End-to-end scenarios for the automaton, driven through the public API.
//
// Each test builds a grid (or a controller) the way a host would, runs a few
// steps, and checks the observable readout. Birth values are pinned with a
// `ScriptedSource` wherever the exact value matters; the property-style
// tests use a seeded `CellRng` so failures reproduce.

use memo_automata::config::AutomatonConfig;
use memo_automata::controller::{Controller, Pointer};
use memo_automata::grid::Grid;
use memo_automata::prng::CellRng;
use memo_automata::quantize::{OctaveRange, Quantization, QuantizeParams, quantize};
use memo_automata::rules::{LifeMode, RuleInterval, RuleSet, ScriptedSource};
use memo_automata::sink::{JsonLinesSink, VecSink};

fn rules(mode: LifeMode, born: (f64, f64), survive: (f64, f64)) -> RuleSet {
    RuleSet {
        born: RuleInterval::new(born.0, born.1).unwrap(),
        survive: RuleInterval::new(survive.0, survive.1).unwrap(),
        mode,
        increment_scale: 0.1,
    }
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn values_stay_in_unit_interval_across_many_steps() {
    for (seed, boolean_life) in [(1, false), (2, true), (3, false)] {
        let config = AutomatonConfig {
            columns: 12,
            rows: 9,
            seed,
            boolean_life,
            increment_scale: 0.7,
            ..AutomatonConfig::default()
        };
        let mut grid = Grid::from_config(&config).unwrap();
        grid.randomize(0.5).unwrap();
        for _ in 0..50 {
            grid.step();
            assert!(
                grid.read_values().iter().all(|v| (0.0..=1.0).contains(v)),
                "seed {seed}: value escaped [0, 1]"
            );
        }
    }
}

#[test]
fn boolean_life_never_produces_fractions_except_births() {
    // Seed with exact 0/1 values and make every birth draw exactly 0.5, so
    // any other fractional value would have to come from the rule itself.
    let mut grid = Grid::new(
        10,
        10,
        rules(LifeMode::Boolean, (3.0, 3.0), (2.0, 3.0)),
        ScriptedSource::new(vec![0.5]),
    )
    .unwrap();
    let mut pattern = CellRng::new(77);
    for col in 0..10 {
        for row in 0..10 {
            if pattern.random_bool(0.4) {
                grid.set_cell_value(col, row, 1.0).unwrap();
            }
        }
    }
    for _ in 0..20 {
        grid.step();
        for v in grid.read_values() {
            assert!(v == 0.0 || v == 1.0 || v == 0.5, "unexpected value {v}");
        }
    }
}

#[test]
fn empty_grid_stays_empty() {
    for mode in [LifeMode::Boolean, LifeMode::Continuous] {
        let mut grid =
            Grid::new(8, 8, rules(mode, (3.0, 6.0), (2.0, 3.0)), CellRng::new(9)).unwrap();
        for _ in 0..10 {
            let summary = grid.step();
            assert_eq!(summary.births, 0);
        }
        assert!(grid.read_values().iter().all(|&v| v == 0.0));
    }
}

#[test]
fn corner_scans_three_neighbors() {
    let mut grid = Grid::new(8, 8, RuleSet::default(), CellRng::new(0)).unwrap();
    // Light every cell; the corner can only see three of them.
    for col in 0..8 {
        for row in 0..8 {
            grid.set_cell_value(col, row, 1.0).unwrap();
        }
    }
    let stats = grid.neighbor_stats(0, 0);
    assert_eq!(stats.active, 3);
    assert_eq!(stats.sum, 3.0);
    assert_eq!(grid.neighbor_stats(4, 4).active, 8);
}

#[test]
fn readout_is_deterministic_and_sized() {
    for (columns, rows) in [(1, 1), (3, 7), (8, 8), (16, 2)] {
        let config = AutomatonConfig {
            columns,
            rows,
            seed: 4,
            ..AutomatonConfig::default()
        };
        let mut grid = Grid::from_config(&config).unwrap();
        grid.randomize(0.5).unwrap();
        let first = grid.read_values();
        assert_eq!(first.len(), columns * rows);
        assert_eq!(first, grid.read_values());
    }
}

#[test]
fn same_seed_same_history() {
    let config = AutomatonConfig {
        seed: 2024,
        ..AutomatonConfig::default()
    };
    let run = || {
        let mut grid = Grid::from_config(&config).unwrap();
        grid.randomize(0.4).unwrap();
        (0..25).map(|_| {
            grid.step();
            grid.read_values()
        })
        .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

// ---------------------------------------------------------------------------
// Scenario 1: lone center cell on a 3×3 grid
// ---------------------------------------------------------------------------

#[test]
fn lone_center_dies_in_boolean_mode() {
    let mut grid = Grid::new(
        3,
        3,
        rules(LifeMode::Boolean, (3.0, 3.0), (2.0, 3.0)),
        ScriptedSource::new(vec![0.9]),
    )
    .unwrap();
    grid.set_cell_value(1, 1, 1.0).unwrap();
    grid.step();
    assert!(grid.read_values().iter().all(|&v| v == 0.0));
}

#[test]
fn lone_center_decays_in_continuous_mode() {
    let mut grid = Grid::new(
        3,
        3,
        rules(LifeMode::Continuous, (3.0, 3.0), (2.0, 3.0)),
        ScriptedSource::new(vec![0.9]),
    )
    .unwrap();
    grid.set_cell_value(1, 1, 1.0).unwrap();
    grid.step();
    // total = 1.0 ∉ [2, 3]; mean = 1.0 → 1.0 - 1.0 * 0.1.
    let center = grid.cell(1, 1).unwrap().value();
    assert!((center - 0.9).abs() < 1e-12, "center = {center}");
    // Every neighbor sums to round(1.0) = 1 ≠ 3: no births.
    let others: f64 = grid.read_values().iter().sum::<f64>() - center;
    assert_eq!(others, 0.0);
}

// ---------------------------------------------------------------------------
// Scenario 2: resize keeps existing values
// ---------------------------------------------------------------------------

#[test]
fn growing_two_by_two_to_four_by_four() {
    let mut grid = Grid::new(2, 2, RuleSet::default(), CellRng::new(0)).unwrap();
    let originals = [((0, 0), 0.1), ((0, 1), 0.2), ((1, 0), 0.3), ((1, 1), 0.4)];
    for ((col, row), v) in originals {
        grid.set_cell_value(col, row, v).unwrap();
    }
    grid.resize(4, 4).unwrap();
    assert_eq!(grid.read_values().len(), 16);
    for ((col, row), v) in originals {
        assert_eq!(grid.cell(col, row).unwrap().value(), v);
    }
    let new_cells = grid
        .render_cells()
        .filter(|c| c.col >= 2 || c.row >= 2)
        .collect::<Vec<_>>();
    assert_eq!(new_cells.len(), 12);
    assert!(new_cells.iter().all(|c| c.value == 0.0));
}

#[test]
fn shrink_then_grow_restores_hidden_cells() {
    let mut grid = Grid::new(4, 4, RuleSet::default(), CellRng::new(0)).unwrap();
    grid.set_cell_value(3, 2, 0.65).unwrap();
    grid.resize(2, 2).unwrap();
    assert_eq!(grid.read_values().len(), 4);
    assert!(grid.cell(3, 2).is_none());
    grid.resize(4, 4).unwrap();
    assert_eq!(grid.cell(3, 2).unwrap().value(), 0.65);
}

// ---------------------------------------------------------------------------
// Scenario 3: unquantized pitch chain
// ---------------------------------------------------------------------------

#[test]
fn unquantized_half_maps_through_mtof() {
    let params = QuantizeParams {
        tonic: 0.0,
        mode: Quantization::from_code(-1),
        octave_range: OctaveRange {
            offset: 0.0,
            span: 127.0,
        },
    };
    let out = quantize(&[0.5], &params);
    let expected = 2f64.powf((63.5 - 69.0) / 12.0) * 440.0;
    assert_eq!(out.len(), 1);
    assert!((out[0] - expected).abs() < 1e-9);
}

#[test]
fn quantize_zero_and_band_for_all_modes() {
    let values: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
    for code in [-1, 0, 1, 4] {
        for (offset, span) in [(0.0, 127.0), (-60.0, 10.0), (100.0, 80.0)] {
            let params = QuantizeParams {
                tonic: 5.0,
                mode: Quantization::from_code(code),
                octave_range: OctaveRange { offset, span },
            };
            let out = quantize(&values, &params);
            assert_eq!(out[0], 0.0);
            assert!(out[1..].iter().all(|f| (20.0..=13000.0).contains(f)));
        }
    }
}

// ---------------------------------------------------------------------------
// Host flow
// ---------------------------------------------------------------------------

#[test]
fn host_session_streams_frames() {
    let config = AutomatonConfig {
        columns: 4,
        rows: 4,
        seed: 8,
        ..AutomatonConfig::default()
    };
    let mut controller = Controller::from_config(&config, VecSink::new()).unwrap();

    // Paused: edits and bangs still emit, nothing steps.
    controller
        .click(Pointer {
            x: 0.0,
            y: 99.0,
            width: 100.0,
            height: 100.0,
            shift: false,
        })
        .unwrap();
    controller.bang().unwrap();
    assert_eq!(controller.grid().generation(), 0);

    controller.set_running(true);
    for _ in 0..3 {
        controller.bang().unwrap();
    }
    controller.set_dimensions(5, 5).unwrap();

    let frames = &controller.sink().frames;
    assert_eq!(frames.len(), 6);
    let ticks: Vec<u64> = frames.iter().map(|f| f.tick).collect();
    assert_eq!(ticks, vec![0, 0, 1, 2, 3, 3]);
    assert_eq!(frames[5].values.len(), 25);
}

#[test]
fn json_lines_session() {
    let config = AutomatonConfig::from_json(r#"{ "columns": 3, "rows": 3, "seed": 1 }"#).unwrap();
    let mut controller =
        Controller::from_config(&config, JsonLinesSink::new(Vec::<u8>::new())).unwrap();
    controller.set_running(true);
    controller.bang().unwrap();
    controller.bang().unwrap();
    controller.finish().unwrap();
    let text = String::from_utf8(controller.into_sink().into_inner()).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|l| l.starts_with("{\"tick\":")));
}
