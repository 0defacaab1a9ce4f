//! Injected pseudo-random source
//!
//! Every random branch in a scenario (user draw, memo privacy, page index,
//! word choice) goes through `RandomSource`, so tests can script them.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

pub trait RandomSource: Send + Sync {
    /// Uniform integer in `0..upper`. Returns 0 when `upper` is 0.
    fn below(&mut self, upper: usize) -> usize;

    fn coin(&mut self) -> bool {
        self.below(2) == 1
    }
}

/// ChaCha8-backed source, seeded per worker
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }
}

/// Replays a fixed list of draws, then returns 0 forever.
/// Each draw is reduced modulo the requested bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.draws.pop_front().unwrap_or(0) % upper
    }
}
