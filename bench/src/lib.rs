//! Memo service benchmark harness
//!
//! Drives a pool of simulated users against a memo web application, checks
//! every response against the service's contract and turns the outcome into
//! a penalized score.

pub mod check;
pub mod client;
pub mod config;
pub mod fixtures;
pub mod random;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod worker;

// Re-export commonly used types
pub use check::{Failure, FailureKind, Tally};
pub use client::{Page, Request, RequestError, RequestExecutor};
pub use config::{Config, OutputFormat};
pub use fixtures::Fixtures;
pub use runner::{BenchmarkResult, HarnessError, Orchestrator, WorkerPlan};
pub use scenario::{Scenario, ScenarioKind};
pub use session::Session;
pub use worker::Worker;
