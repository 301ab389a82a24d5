//! Deterministic random number generation for rounds and pacing.
//!
//! Every round owns its own `GameRng` so deck shuffles and stock reshuffles
//! are reproducible from the match seed. The intent scheduler forks its own
//! stream so automated pacing never perturbs the cards.
//!
//! ```
//! use dotenko_engine::core::GameRng;
//!
//! let mut match_rng = GameRng::new(7);
//! let mut round_one = match_rng.fork();
//! let mut replay = GameRng::new(7).fork();
//!
//! let mut a = vec![1, 2, 3, 4, 5];
//! let mut b = a.clone();
//! round_one.shuffle(&mut a);
//! replay.shuffle(&mut b);
//! assert_eq!(a, b);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic ChaCha8-backed RNG with forking.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Fork an independent, deterministic stream.
    ///
    /// The n-th fork of a given seed always yields the same stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self::new(fork_seed)
    }

    /// Seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in the inclusive range `[low, high]`.
    pub fn gen_inclusive(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Capture the stream position.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            fork_counter: self.fork_counter,
        }
    }

    /// Restore a stream captured with [`GameRng::state`].
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            fork_counter: state.fork_counter,
        }
    }
}

/// Serializable RNG position, O(1) regardless of how much was drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
    pub fork_counter: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_inclusive(1, 3), rng2.gen_inclusive(1, 3));
        }
    }

    #[test]
    fn test_gen_inclusive_stays_in_bounds() {
        let mut rng = GameRng::new(9);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let v = rng.gen_inclusive(1, 3);
            assert!((1..=3).contains(&v));
            seen[v as usize] = true;
        }
        assert!(seen[1] && seen[2] && seen[3]);
        assert_eq!(rng.gen_inclusive(5, 5), 5);
    }

    #[test]
    fn test_forks_differ_but_replay() {
        let mut rng = GameRng::new(42);
        let first = rng.fork();
        let second = rng.fork();
        assert_ne!(first.seed(), second.seed());

        let mut again = GameRng::new(42);
        assert_eq!(again.fork().seed(), first.seed());
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut data: Vec<u8> = (1..=20).collect();
        rng.shuffle(&mut data);
        assert_ne!(data, (1..=20).collect::<Vec<_>>());
        data.sort_unstable();
        assert_eq!(data, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_state_roundtrip_continues_stream() {
        let mut rng = GameRng::new(42);
        for _ in 0..50 {
            rng.gen_inclusive(0, 1000);
        }
        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.gen_inclusive(0, 1000)).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.gen_inclusive(0, 1000)).collect();
        assert_eq!(expected, actual);
    }
}
