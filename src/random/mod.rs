//! # Random Streams
//!
//! Every sampling entry point in the kernel takes a `&mut impl RandomStream`
//! instead of reaching for a global generator. Production runs use
//! [`RandomGenerator`]; tests swap in [`ReplayStream`] to drive a history down
//! a known path.
//!
//! ## Generators
//!
//! - [`RandomGenerator`]: xoshiro256** seeded through SplitMix64, period 2^256 - 1.
//!   `begin_history(h)` re-derives the state from `(seed, h)`, giving each
//!   history its own reproducible sub-stream independent of how many variates
//!   earlier histories consumed.
//! - [`ReplayStream`]: fixed sequence, replayed in order and wrapping at the end.
//! - [`RngStream`]: adapter for any `rand` generator.

use rand::{Rng, RngCore};

use crate::error::{Error, Result};

/// Source of uniform variates in `[0, 1)`.
pub trait RandomStream {
    /// Next uniform variate in `[0, 1)`
    fn uniform(&mut self) -> f64;

    /// Called by the transport loop before history `history` starts.
    fn begin_history(&mut self, _history: u64) {}

    /// Uniform in `[a, b)`
    fn uniform_range(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.uniform()
    }
}

impl<S: RandomStream + ?Sized> RandomStream for &mut S {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    fn begin_history(&mut self, history: u64) {
        (**self).begin_history(history)
    }
}

// ============================================================================
// XOSHIRO256**
// ============================================================================

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

#[inline]
fn splitmix64(s: &mut u64) -> u64 {
    *s = s.wrapping_add(GOLDEN_GAMMA);
    let mut z = *s;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Pseudo-random number generator (xoshiro256**)
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    seed: u64,
    state: [u64; 4],
}

impl RandomGenerator {
    /// Create new RNG with seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            state: Self::seed_state(seed),
        }
    }

    fn seed_state(seed: u64) -> [u64; 4] {
        let mut s = seed;
        let mut state = [0u64; 4];
        for slot in state.iter_mut() {
            *slot = splitmix64(&mut s);
        }
        state
    }

    /// Seed this generator was built with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;

        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];

        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);

        result
    }
}

impl RandomStream for RandomGenerator {
    #[inline]
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn begin_history(&mut self, history: u64) {
        let mut s = self.seed ^ history.wrapping_mul(GOLDEN_GAMMA);
        let derived = splitmix64(&mut s);
        self.state = Self::seed_state(derived);
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}

// ============================================================================
// REPLAY
// ============================================================================

/// Deterministic stream that replays a fixed list of variates, wrapping
/// around to the start once exhausted.
#[derive(Debug, Clone)]
pub struct ReplayStream {
    values: Vec<f64>,
    cursor: usize,
}

impl ReplayStream {
    /// Build from a non-empty list of values in `[0, 1)`.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidParam("replay stream needs at least one value".into()));
        }
        if let Some(bad) = values.iter().find(|v| !(0.0..1.0).contains(*v)) {
            return Err(Error::InvalidParam(format!(
                "replay value {bad} outside [0, 1)"
            )));
        }
        Ok(Self { values, cursor: 0 })
    }
}

impl RandomStream for ReplayStream {
    fn uniform(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

// ============================================================================
// RAND ADAPTER
// ============================================================================

/// Drives the kernel from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngStream<R: RngCore>(pub R);

impl<R: RngCore> RandomStream for RngStream<R> {
    fn uniform(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rng_uniform() {
        let mut rng = RandomGenerator::new(12345);

        let samples: Vec<f64> = (0..10000).map(|_| rng.uniform()).collect();

        assert!(samples.iter().all(|&x| (0.0..1.0).contains(&x)));

        let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 0.5).abs() < 0.02, "Mean {} should be ~0.5", mean);
    }

    #[test]
    fn test_history_substreams_are_reproducible() {
        let mut a = RandomGenerator::new(7);
        let mut b = RandomGenerator::new(7);

        a.begin_history(3);
        let first: Vec<f64> = (0..5).map(|_| a.uniform()).collect();

        // b burns variates in other histories first
        b.begin_history(0);
        for _ in 0..100 {
            b.uniform();
        }
        b.begin_history(3);
        let second: Vec<f64> = (0..5).map(|_| b.uniform()).collect();

        assert_eq!(first, second);

        a.begin_history(4);
        assert_ne!(a.uniform(), first[0]);
    }

    #[test]
    fn test_replay_wraps() -> Result<()> {
        let mut s = ReplayStream::new(vec![0.1, 0.5, 0.9])?;
        let drawn: Vec<f64> = (0..5).map(|_| s.uniform()).collect();
        assert_eq!(drawn, vec![0.1, 0.5, 0.9, 0.1, 0.5]);
        Ok(())
    }

    #[test]
    fn test_replay_rejects_bad_values() {
        assert!(ReplayStream::new(vec![]).is_err());
        assert!(ReplayStream::new(vec![0.2, 1.0]).is_err());
        assert!(ReplayStream::new(vec![-0.1]).is_err());
    }

    #[test]
    fn test_rand_adapter_range() {
        let mut s = RngStream(StdRng::seed_from_u64(99));
        for _ in 0..1000 {
            let u = s.uniform();
            assert!((0.0..1.0).contains(&u));
        }
        let r = s.uniform_range(2.0, 3.0);
        assert!((2.0..3.0).contains(&r));
    }
}
