//! Per-worker result accumulator

use serde::Serialize;

use super::failure::Failure;

/// Successes, score and failures observed by one worker
///
/// Owned by exactly one worker while it runs; merged with [`Tally::absorb`]
/// only after the worker has finished.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tally {
    pub successes: u64,
    pub score: f64,
    pub fails: usize,
    pub failures: Vec<Failure>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a success worth `credit` points. Negative credit is ignored.
    pub fn success(&mut self, credit: f64) {
        self.successes += 1;
        if credit > 0.0 {
            self.score += credit;
        }
    }

    pub fn fail(&mut self, failure: Failure) {
        self.fails += 1;
        self.failures.push(failure);
    }

    /// Fold another worker's tally into this one
    pub fn absorb(&mut self, other: Tally) {
        self.successes += other.successes;
        self.score += other.score;
        self.fails += other.fails;
        self.failures.extend(other.failures);
    }

    /// Human-readable failure reasons, in the order they were recorded
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.message.as_str())
    }
}
