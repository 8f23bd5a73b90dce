//! Match PRNG
//!
//! One ChaCha8 stream per match, seeded from the persisted seed. The number
//! of consumed draws is tracked so a resumed match can skip exactly the
//! numbers already used and continue the same sequence.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// 2^-53, maps the top 53 bits of a `u64` onto `[0, 1)`.
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

#[derive(Debug, Clone)]
pub struct MatchRng {
    draws: u64,
    inner: ChaCha8Rng,
}

impl MatchRng {
    pub fn new(seed: u64) -> Self {
        Self { draws: 0, inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Rebuild the stream and discard the first `draws` values.
    pub fn resume(seed: u64, draws: u64) -> Self {
        let mut rng = Self::new(seed);
        for _ in 0..draws {
            rng.inner.next_u64();
        }
        rng.draws = draws;
        rng
    }

    /// Uniform draw in `[0, 1)`. Every call counts as exactly one draw.
    #[inline]
    pub fn next_unit(&mut self) -> f64 {
        self.draws += 1;
        (self.inner.next_u64() >> 11) as f64 * UNIT_SCALE
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}
