// Presentation-facing data: what a drawing backend needs, and nothing more.
//
// The core does not draw. It exposes:
// - `RenderCell`: a per-cell snapshot. `value` drives opacity and
//   `just_born` selects the highlight color.
// - `cell_at_point`: the minimal pointer → cell mapping for click/drag
//   edits. The y axis is flipped (row 0 is at the bottom of the view), and
//   positions outside the view clamp to the nearest edge cell.
// - `playhead_cell`: the cell a sequencer step index points at, walking the
//   same column-major order as the readout.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderCell {
    pub col: usize,
    pub row: usize,
    pub value: f64,
    pub just_born: bool,
}

/// Map a pointer position inside a `width × height` view onto a cell of a
/// `columns × rows` grid.
pub fn cell_at_point(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    columns: usize,
    rows: usize,
) -> (usize, usize) {
    let col = axis_index(x / width, columns);
    let row = axis_index(1.0 - y / height, rows);
    (col, row)
}

/// `floor(fraction * count)` clamped into `[0, count)`. NaN lands on 0.
fn axis_index(fraction: f64, count: usize) -> usize {
    let max = count.saturating_sub(1);
    let raw = (fraction * count as f64).floor();
    if raw.is_nan() || raw < 0.0 {
        0
    } else {
        (raw as usize).min(max)
    }
}

/// The cell under sequencer step `step`, wrapping past the last cell.
pub fn playhead_cell(step: usize, columns: usize, rows: usize) -> (usize, usize) {
    let total = columns * rows;
    if total == 0 {
        return (0, 0);
    }
    let step = step % total;
    (step / rows, step % rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_maps_with_flipped_y() {
        // Top-left of a 100×100 view is column 0, top row.
        assert_eq!(cell_at_point(0.0, 0.0, 100.0, 100.0, 8, 8), (0, 7));
        // Bottom-right corner clamps into the last column, row 0.
        assert_eq!(cell_at_point(100.0, 100.0, 100.0, 100.0, 8, 8), (7, 0));
        assert_eq!(cell_at_point(30.0, 60.0, 100.0, 100.0, 8, 8), (2, 3));
    }

    #[test]
    fn pointer_outside_view_clamps() {
        assert_eq!(cell_at_point(-20.0, -20.0, 100.0, 100.0, 4, 4), (0, 3));
        assert_eq!(cell_at_point(500.0, 500.0, 100.0, 100.0, 4, 4), (3, 0));
    }

    #[test]
    fn degenerate_view_does_not_panic() {
        assert_eq!(cell_at_point(10.0, 10.0, 0.0, 0.0, 4, 4), (3, 0));
        assert_eq!(cell_at_point(0.0, 0.0, 0.0, 0.0, 4, 4), (0, 0));
    }

    #[test]
    fn playhead_walks_column_major_and_wraps() {
        assert_eq!(playhead_cell(0, 3, 2), (0, 0));
        assert_eq!(playhead_cell(1, 3, 2), (0, 1));
        assert_eq!(playhead_cell(2, 3, 2), (1, 0));
        assert_eq!(playhead_cell(5, 3, 2), (2, 1));
        assert_eq!(playhead_cell(6, 3, 2), (0, 0));
    }
}
