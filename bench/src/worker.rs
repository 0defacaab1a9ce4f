//! Worker loop: one session driven by one scenario until its deadline

use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::check::Tally;
use crate::scenario::Scenario;
use crate::session::Session;

/// A worker stops early once it has recorded this many failures
pub const MAX_FAILS: usize = 5;

pub struct Worker {
    session: Session,
    scenario: Box<dyn Scenario>,
}

impl Worker {
    pub fn new(session: Session, scenario: Box<dyn Scenario>) -> Self {
        Self { session, scenario }
    }

    pub fn id(&self) -> usize {
        self.session.id()
    }

    /// Iterate the scenario until `duration` elapses or too many failures
    /// accumulate, then hand back the session's tally.
    pub async fn run(mut self, duration: Duration) -> Tally {
        let id = self.session.id();
        let kind = self.scenario.kind();
        info!(
            worker = id,
            scenario = %kind,
            checker = self.session.is_checker(),
            "worker started"
        );

        self.session.start();
        let running = self.session.running_flag();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            running.store(false, Ordering::SeqCst);
        });

        let started = Instant::now();
        let mut iterations = 0u64;
        while self.session.is_running() && self.session.tally().fails < MAX_FAILS {
            self.scenario.iterate(&mut self.session).await;
            iterations += 1;
        }
        timer.abort();

        let fails = self.session.tally().fails;
        if fails >= MAX_FAILS {
            info!(worker = id, fails, "worker gave up after too many failures");
        }
        self.session.stop();
        debug!(
            worker = id,
            iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worker finished"
        );
        self.session.into_tally()
    }
}
