// Dense 2D cell container keyed by (column, row).
//
// Cells live in a flat `Vec<Cell>` laid out column-major:
// `index = col * capacity_rows + row`. The container distinguishes the
// *active* region (the current `columns × rows`) from the *allocated*
// region, because storage only ever grows: shrinking the grid just narrows
// the active region, and the hidden cells keep their values until the grid
// grows back over them.
//
// Out-of-bounds reads return `None` and Moore-neighbor iteration silently
// skips positions outside the active region. Edges are hard boundaries,
// never wrapped.
//
// See also: `grid.rs`, which owns a `Lattice` and drives the two-phase
// update over it.

use crate::cell::Cell;

/// The eight Moore-neighborhood offsets `(dc, dr)`, center excluded.
pub const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone)]
pub struct Lattice {
    cells: Vec<Cell>,
    columns: usize,
    rows: usize,
    capacity_columns: usize,
    capacity_rows: usize,
}

impl Lattice {
    /// Allocate a lattice of dead cells. Callers validate that both
    /// dimensions are at least 1.
    pub fn new(columns: usize, rows: usize) -> Self {
        Lattice {
            cells: allocate(columns, rows, &[], 0),
            columns,
            rows,
            capacity_columns: columns,
            capacity_rows: rows,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of cells in the active region.
    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a signed coordinate lies inside the active region.
    pub fn in_bounds(&self, col: isize, row: isize) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.columns && (row as usize) < self.rows
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        if col < self.columns && row < self.rows {
            Some(col * self.capacity_rows + row)
        } else {
            None
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Cell> {
        self.index(col, row).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        self.index(col, row).map(|i| &mut self.cells[i])
    }

    /// In-bounds Moore neighbors of `(col, row)`, center excluded.
    ///
    /// A corner yields 3 cells, an edge 5, an interior cell 8.
    pub fn neighbors(&self, col: usize, row: usize) -> impl Iterator<Item = &Cell> + '_ {
        MOORE_OFFSETS.iter().filter_map(move |&(dc, dr)| {
            let c = col as isize + dc;
            let r = row as isize + dr;
            if self.in_bounds(c, r) {
                self.get(c as usize, r as usize)
            } else {
                None
            }
        })
    }

    /// Active cells in column-major order (outer columns, inner rows).
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        let rows = self.rows;
        self.cells
            .chunks(self.capacity_rows)
            .take(self.columns)
            .flat_map(move |column| column[..rows].iter())
    }

    /// Mutable active cells, same order as `iter()`.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        let rows = self.rows;
        self.cells
            .chunks_mut(self.capacity_rows)
            .take(self.columns)
            .flat_map(move |column| column[..rows].iter_mut())
    }

    /// Change the active region. Storage grows to cover the new region when
    /// needed and is never released; existing cells keep their values.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        let new_cap_cols = self.capacity_columns.max(columns);
        let new_cap_rows = self.capacity_rows.max(rows);
        if new_cap_cols != self.capacity_columns || new_cap_rows != self.capacity_rows {
            self.cells = allocate(new_cap_cols, new_cap_rows, &self.cells, self.capacity_rows);
            self.capacity_columns = new_cap_cols;
            self.capacity_rows = new_cap_rows;
        }
        self.columns = columns;
        self.rows = rows;
    }

    /// Allocated (not active) dimensions.
    pub fn capacity(&self) -> (usize, usize) {
        (self.capacity_columns, self.capacity_rows)
    }
}

/// Build column-major storage of `columns × rows`, copying any cell from
/// `old` (laid out with stride `old_rows`) whose coordinate still fits.
fn allocate(columns: usize, rows: usize, old: &[Cell], old_rows: usize) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(columns * rows);
    for col in 0..columns {
        for row in 0..rows {
            let carried = if row < old_rows {
                old.get(col * old_rows + row).copied()
            } else {
                None
            };
            cells.push(carried.unwrap_or_else(|| Cell::new(col, row)));
        }
    }
    cells
}
