//! Final score and run report

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::check::Tally;
use crate::scenario::ScenarioKind;

/// Failures tolerated before the score is penalized
pub const ALLOW_FAILS: usize = 3;

/// Fraction of the raw score kept after `fails` failures.
/// Drops quadratically past `ALLOW_FAILS` and reaches zero at 10 excess failures.
pub fn penalty_factor(fails: usize) -> f64 {
    let excess = fails.saturating_sub(ALLOW_FAILS) as f64;
    (100.0 - excess * excess).max(0.0) / 100.0
}

pub fn final_score(raw: f64, fails: usize) -> f64 {
    raw * penalty_factor(fails)
}

/// Per-worker line of the report
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub id: usize,
    pub scenario: ScenarioKind,
    pub checker: bool,
    pub successes: u64,
    pub fails: usize,
    pub score: f64,
}

/// Aggregated outcome of a benchmark run
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub raw_score: f64,
    pub successes: u64,
    pub fails: usize,
    pub score: f64,
    pub workers: Vec<WorkerSummary>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub finished_at: DateTime<Utc>,
    /// Failure reasons in the order the workers reported them
    pub logs: Vec<String>,
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_secs_f64())
}

impl BenchmarkResult {
    pub fn from_tally(
        tally: Tally,
        workers: Vec<WorkerSummary>,
        duration: Duration,
    ) -> Self {
        let logs = tally.reasons().map(str::to_string).collect();
        Self {
            raw_score: tally.score,
            successes: tally.successes,
            fails: tally.fails,
            score: final_score(tally.score, tally.fails),
            workers,
            duration,
            finished_at: Utc::now(),
            logs,
        }
    }

    /// A run passes when any score survives the failure penalty
    pub fn passed(&self) -> bool {
        self.score > 0.0
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn print_summary(&self) {
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!(
            " RESULTS: {} workers, {:.0}s",
            self.workers.len(),
            self.duration.as_secs_f64()
        );
        println!("═══════════════════════════════════════════════════════════════");
        println!();
        println!("   Successes:    {}", self.successes);
        println!("   Fails:        {}", self.fails);
        println!("   Raw score:    {:.2}", self.raw_score);
        println!("   Score:        {:.2}", self.score);
        println!();

        if !self.logs.is_empty() {
            println!(" ─── Failures ────────────────────────────────────────────────");
            println!();
            for line in &self.logs {
                println!("   {line}");
            }
            println!();
        }

        println!("═══════════════════════════════════════════════════════════════");
        println!(" Result: {}", if self.passed() { "SUCCESS" } else { "FAIL" });
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}
