// A single automaton cell with a two-phase (pending → commit) update.
//
// Each generation the rule engine writes every cell's next value into its
// pending slot first, and only then are all cells committed. Reads during
// the compute pass therefore always see the previous generation, which is
// what gives the automaton its simultaneous-update semantics.
//
// Committing also derives the `just_born` flag (the cell went from exactly 0
// to something positive), which a drawing backend uses to highlight births.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    col: usize,
    row: usize,
    /// Live value in [0, 1].
    value: f64,
    /// Write buffer for the next generation. Not clamped here.
    pending: f64,
    just_born: bool,
}

impl Cell {
    /// A dead cell at the given coordinate.
    pub fn new(col: usize, row: usize) -> Self {
        Cell {
            col,
            row,
            value: 0.0,
            pending: 0.0,
            just_born: false,
        }
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// True if the last commit took this cell from 0 to a positive value.
    pub fn just_born(&self) -> bool {
        self.just_born
    }

    pub fn is_active(&self) -> bool {
        self.value > 0.0
    }

    /// Stage `v` as the value for the next commit.
    pub fn set_pending(&mut self, v: f64) {
        self.pending = v;
    }

    /// Promote the pending value to the live value.
    pub fn commit(&mut self) {
        self.just_born = self.value == 0.0 && self.pending > 0.0;
        self.value = self.pending;
    }
}
