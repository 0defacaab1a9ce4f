//! Benchmark orchestration
//!
//! This module provides:
//! - `WorkerPlan`: how many workers run each scenario for a workload
//! - `Orchestrator`: builds sessions, runs every worker concurrently, aggregates
//! - `BenchmarkResult`: final score and report

mod score;

pub use score::{ALLOW_FAILS, BenchmarkResult, WorkerSummary, final_score, penalty_factor};

use reqwest::Url;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::check::{Failure, FailureKind, Tally};
use crate::client::{RequestError, RequestExecutor};
use crate::config::Config;
use crate::fixtures::Fixtures;
use crate::random::{RandomSource, SeededRandom};
use crate::scenario::ScenarioKind;
use crate::session::Session;
use crate::worker::Worker;

/// Multiplier applied to the squared load when sizing the worker pool
pub const WORKLOAD_FACTOR: usize = 2;

/// Largest workload honoured; anything above is planned as this
pub const MAX_WORKLOAD: usize = 256;

/// Setup problems that abort a run before any worker starts
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("http client setup failed: {0}")]
    Client(#[from] RequestError),
}

/// Number of workers per scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPlan {
    pub static_load: usize,
    pub recent_crawl: usize,
    pub full_journey: usize,
}

impl WorkerPlan {
    pub fn for_workload(workload: usize) -> Self {
        let workload = workload.min(MAX_WORKLOAD);
        if workload == 0 {
            return Self {
                static_load: 0,
                recent_crawl: 0,
                full_journey: 1,
            };
        }
        let load = workload + 1;
        let total = load * load * WORKLOAD_FACTOR;
        Self {
            static_load: workload,
            recent_crawl: workload,
            full_journey: total - 2 * workload,
        }
    }

    pub fn total(&self) -> usize {
        self.static_load + self.recent_crawl + self.full_journey
    }

    /// Worker ids paired with their scenario. Ids count down from
    /// `total - 1` through static, recent and then journey workers, so the
    /// lowest ids (the strict checkers) always run the full journey.
    pub fn assignments(&self) -> Vec<(usize, ScenarioKind)> {
        let groups = [
            (ScenarioKind::StaticLoad, self.static_load),
            (ScenarioKind::RecentCrawl, self.recent_crawl),
            (ScenarioKind::FullJourney, self.full_journey),
        ];
        let mut next = self.total();
        let mut out = Vec::with_capacity(next);
        for (kind, count) in groups {
            for _ in 0..count {
                next -= 1;
                out.push((next, kind));
            }
        }
        out
    }
}

struct WorkerReport {
    id: usize,
    tally: Tally,
}

pub struct Orchestrator {
    config: Config,
    fixtures: Arc<Fixtures>,
}

impl Orchestrator {
    pub fn new(config: Config, fixtures: Fixtures) -> Self {
        Self {
            config,
            fixtures: Arc::new(fixtures),
        }
    }

    fn rng_for(&self, id: usize) -> Box<dyn RandomSource> {
        match self.config.seed {
            Some(seed) => Box::new(SeededRandom::from_seed(seed.wrapping_add(id as u64))),
            None => Box::new(SeededRandom::from_entropy()),
        }
    }

    fn validate_endpoint(&self) -> Result<(), HarnessError> {
        let endpoint = &self.config.endpoint;
        let url = Url::parse(endpoint).map_err(|e| HarnessError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HarnessError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(())
    }

    /// Run every worker until the configured duration elapses and aggregate
    /// their tallies into a scored result.
    pub async fn run(&self) -> Result<BenchmarkResult, HarnessError> {
        self.validate_endpoint()?;

        if self.config.workload > MAX_WORKLOAD {
            warn!(
                workload = self.config.workload,
                max = MAX_WORKLOAD,
                "workload capped"
            );
        }
        let plan = WorkerPlan::for_workload(self.config.workload);
        let assignments = plan.assignments();
        info!(
            endpoint = %self.config.endpoint,
            workload = self.config.workload,
            workers = plan.total(),
            static_load = plan.static_load,
            recent_crawl = plan.recent_crawl,
            full_journey = plan.full_journey,
            "starting benchmark"
        );

        // Build everything up front so setup errors abort before any traffic
        let mut workers = Vec::with_capacity(assignments.len());
        let mut planned = BTreeMap::new();
        for &(id, kind) in &assignments {
            let executor = RequestExecutor::new(id, &self.config.request)?;
            let session = Session::new(
                id,
                &self.config.endpoint,
                executor,
                self.fixtures.clone(),
                self.config.target.clone(),
                self.rng_for(id),
            );
            planned.insert(id, (kind, session.is_checker()));
            workers.push(Worker::new(session, kind.build()));
        }

        let duration = self.config.duration;
        let (tx, mut rx) = mpsc::channel::<WorkerReport>(workers.len().max(1));
        let mut handles = Vec::with_capacity(workers.len());
        for worker in workers {
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                let id = worker.id();
                let tally = worker.run(duration).await;
                if tx.send(WorkerReport { id, tally }).await.is_err() {
                    warn!(worker = id, "result channel closed before report");
                }
            }));
        }
        drop(tx);

        let mut reports = BTreeMap::new();
        while let Some(report) = rx.recv().await {
            reports.insert(report.id, report.tally);
        }
        for handle in handles {
            if let Err(e) = handle.await {
                error!("worker task failed: {}", e);
            }
        }

        Ok(self.aggregate(planned, reports, duration))
    }

    fn aggregate(
        &self,
        planned: BTreeMap<usize, (ScenarioKind, bool)>,
        mut reports: BTreeMap<usize, Tally>,
        duration: Duration,
    ) -> BenchmarkResult {
        let mut total = Tally::new();
        let mut summaries = Vec::with_capacity(planned.len());
        for (id, (scenario, checker)) in planned {
            let tally = reports.remove(&id).unwrap_or_else(|| {
                let mut missing = Tally::new();
                missing.fail(Failure::new(
                    FailureKind::Transport,
                    format!("worker {id} exited without a report"),
                ));
                missing
            });
            summaries.push(WorkerSummary {
                id,
                scenario,
                checker,
                successes: tally.successes,
                fails: tally.fails,
                score: tally.score,
            });
            total.absorb(tally);
        }

        let result = BenchmarkResult::from_tally(total, summaries, duration);
        info!(
            successes = result.successes,
            fails = result.fails,
            raw_score = result.raw_score,
            score = result.score,
            "benchmark finished"
        );
        result
    }
}
