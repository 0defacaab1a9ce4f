//! Scripted traffic patterns
//!
//! This module provides:
//! - `Scenario` trait: one iteration of a traffic pattern against a session
//! - `StaticLoad`: static asset loop
//! - `RecentCrawl`: read-only crawl of the recent listing
//! - `FullJourney`: sign-in, post, validate, sign-out
//! - `pages`: page inspections and shared steps

mod journey;
pub mod pages;
mod recent;
mod static_load;

pub use journey::{FullJourney, Visibility};
pub use recent::RecentCrawl;
pub use static_load::StaticLoad;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::session::Session;

/// A traffic pattern run repeatedly by one worker
#[async_trait]
pub trait Scenario: Send {
    fn kind(&self) -> ScenarioKind;

    /// Run one iteration. Failures are recorded on the session, never returned.
    async fn iterate(&mut self, session: &mut Session);
}

/// Which scenario a worker runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    StaticLoad,
    RecentCrawl,
    FullJourney,
}

impl ScenarioKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::StaticLoad => "static-load",
            ScenarioKind::RecentCrawl => "recent-crawl",
            ScenarioKind::FullJourney => "full-journey",
        }
    }

    pub fn build(self) -> Box<dyn Scenario> {
        match self {
            ScenarioKind::StaticLoad => Box::new(StaticLoad),
            ScenarioKind::RecentCrawl => Box::new(RecentCrawl),
            ScenarioKind::FullJourney => Box::new(FullJourney),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
