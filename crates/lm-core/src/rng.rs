//! Deterministic simulation RNG.
//!
//! Lockstep peers replay the same tick sequence from the same seed, so every
//! random draw the engine makes goes through one [`SimRng`] owned by the
//! world and consumed in train-index order.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// World-level RNG.  Single-threaded by construction.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent stream, e.g. for a scenario generator that must
    /// not perturb the engine's own draws.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.0.r#gen()
    }

    /// Uniform index into a collection of `len` items.  `len` must be non-zero.
    #[inline]
    pub fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick from empty set");
        self.0.gen_range(0..len)
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
