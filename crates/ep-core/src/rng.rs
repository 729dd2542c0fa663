//! Deterministic per-place RNG.
//!
//! # Determinism strategy
//!
//! Every place owns its own `SmallRng`, seeded only from the run number and
//! the place index:
//!
//!   seed = run_number XOR (place_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive place indices across the seed space.  Because a
//! place is only ever touched by the shard that owns it, the sequence of draws
//! a place sees depends on event order alone, never on thread timing.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::PlaceId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-place deterministic RNG.
pub struct PlaceRng(SmallRng);

impl PlaceRng {
    /// Seed deterministically from the run number and a place index.
    pub fn new(run_number: u64, place: PlaceId) -> Self {
        let seed = run_number ^ (place.0 as u64 + 1).wrapping_mul(MIXING_CONSTANT);
        PlaceRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed directly; used by tests and standalone tools.
    pub fn from_seed(seed: u64) -> Self {
        PlaceRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// Uniform draw in `(0, 1]`; safe to take the logarithm of.
    #[inline]
    pub fn uniform_open0(&mut self) -> f64 {
        1.0 - self.0.r#gen::<f64>()
    }

    /// Uniform index in `0..n`.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    #[inline]
    pub fn index(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
