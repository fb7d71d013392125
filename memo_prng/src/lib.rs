// Deterministic, portable pseudo-random number generator for the automaton.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled so that a given seed replays the exact same sequence of births
// and pointer edits on every platform, which is what makes a recorded run
// reproducible from its config file alone.
//
// Consumers:
// - `memo_automata::grid` draws birth values from a `CellRng` (through the
//   `UnitSource` trait, so tests can substitute a scripted source).
// - `memo_automata::controller` owns a second, forked `CellRng` for pointer
//   edits so that clicking a cell does not perturb the birth stream.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state. The core generator uses integer
// arithmetic only; floats are derived from the top bits at the very end.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ generator, the automaton's only source of randomness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRng {
    s: [u64; 4],
}

impl CellRng {
    /// Create a generator seeded from a `u64`.
    ///
    /// SplitMix64 expands the seed into the 256-bit state, so small and
    /// adjacent seeds still give unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Derive an independent generator from this one's stream.
    ///
    /// Advances `self` by one draw.
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u64())
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1), built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// `true` with probability `p`. `p <= 0` is never true, `p >= 1` always.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// SplitMix64 step, used only to expand a seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
