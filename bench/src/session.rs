//! Per-worker session state
//!
//! A `Session` bundles everything one simulated user owns: its executor and
//! cookie store, the captured username and anti-forgery token, the last seen
//! memo total, the running flag and the worker's private `Tally`.

use reqwest::{StatusCode, Url};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::check::{Failure, Tally, expect_status};
use crate::client::{Page, Request, RequestError, RequestExecutor};
use crate::config::TargetConfig;
use crate::fixtures::Fixtures;
use crate::random::RandomSource;

/// Workers with an id below this perform deep content validation
pub const MAX_CHECKERS: usize = 4;

pub struct Session {
    id: usize,
    endpoint: String,
    checker: bool,
    username: Option<String>,
    token: String,
    total_memos: usize,
    running: Arc<AtomicBool>,
    tally: Tally,
    executor: RequestExecutor,
    fixtures: Arc<Fixtures>,
    target: TargetConfig,
    rng: Box<dyn RandomSource>,
}

impl Session {
    pub fn new(
        id: usize,
        endpoint: &str,
        executor: RequestExecutor,
        fixtures: Arc<Fixtures>,
        target: TargetConfig,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let checker = id < MAX_CHECKERS;
        debug!(worker = id, checker, "session created");
        Self {
            id,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            checker,
            username: None,
            token: String::new(),
            total_memos: 0,
            running: Arc::new(AtomicBool::new(false)),
            tally: Tally::new(),
            executor,
            fixtures,
            target,
            rng,
        }
    }

    /// Override the strict-checker flag derived from the worker id
    pub fn with_checker(mut self, checker: bool) -> Self {
        self.checker = checker;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_checker(&self) -> bool {
        self.checker
    }

    // --- lifecycle ---

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Handle used by the deadline timer to stop this session
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn into_tally(self) -> Tally {
        self.tally
    }

    // --- outcome recording (ignored once the session has stopped) ---

    pub fn success(&mut self, credit: f64) {
        if self.is_running() {
            self.tally.success(credit);
        }
    }

    pub fn fail(&mut self, failure: Failure) {
        if self.is_running() {
            warn!(worker = self.id, kind = %failure.kind, "[FAIL] {}", failure.message);
            self.tally.fail(failure);
        }
    }

    /// Record `outcome` as a success worth `credit`, or as its failure
    pub fn record(&mut self, outcome: Result<(), Failure>, credit: f64) {
        match outcome {
            Ok(()) => self.success(credit),
            Err(failure) => self.fail(failure),
        }
    }

    // --- identity ---

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn set_token(&mut self, token: String) {
        self.token = token;
    }

    pub fn total_memos(&self) -> usize {
        self.total_memos
    }

    pub fn set_total_memos(&mut self, total: usize) {
        self.total_memos = total;
    }

    /// Forget cookies, token and username so nothing leaks across iterations
    pub fn reset_identity(&mut self) {
        self.executor.cookies().reset();
        self.token.clear();
        self.username = None;
    }

    /// Names of the cookies currently held for the endpoint
    pub fn cookie_names(&self) -> Vec<String> {
        match Url::parse(&self.endpoint) {
            Ok(url) => self.executor.cookies().names(&url),
            Err(_) => Vec::new(),
        }
    }

    // --- shared data and randomness ---

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn below(&mut self, upper: usize) -> usize {
        self.rng.below(upper)
    }

    pub fn coin(&mut self) -> bool {
        self.rng.coin()
    }

    pub fn random_user(&mut self) -> String {
        self.fixtures.random_user(self.rng.as_mut())
    }

    pub fn random_title(&mut self) -> String {
        self.fixtures.title(self.rng.as_mut())
    }

    pub fn random_content(&mut self, title: &str) -> String {
        self.fixtures.content(title, self.rng.as_mut())
    }

    // --- requests ---

    /// Absolute URL for a target path or an absolute link found in a page
    pub fn url(&self, path: &str) -> Result<Url, RequestError> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}/{}", self.endpoint, path)
        };
        Url::parse(&raw).map_err(|e| RequestError::InvalidUrl(format!("{raw}: {e}")))
    }

    pub fn get(&self, path: &str) -> Result<Request, RequestError> {
        Ok(Request::get(self.url(path)?))
    }

    pub fn post(&self, path: &str, fields: &[(&str, &str)]) -> Result<Request, RequestError> {
        Ok(Request::post_form(self.url(path)?, fields))
    }

    /// Send a request; refused once the session has stopped
    pub async fn send(&self, request: Request) -> Result<Page, RequestError> {
        if !self.is_running() {
            return Err(RequestError::Stopped {
                url: request.url.to_string(),
            });
        }
        self.executor.send(request).await
    }

    /// Record a request-level error as a failure
    pub fn fail_request(&mut self, err: &RequestError) {
        if matches!(err, RequestError::Stopped { .. }) {
            return;
        }
        self.fail(Failure::from(err));
    }

    /// Send a request and require `expected` status.
    /// Every problem is recorded; `None` means the caller should skip
    /// inspecting the response.
    pub async fn fetch(
        &mut self,
        request: Result<Request, RequestError>,
        expected: StatusCode,
    ) -> Option<Page> {
        let page = match request {
            Ok(request) => self.send(request).await,
            Err(err) => Err(err),
        };
        match page {
            Ok(page) => match expect_status(&page, expected) {
                Ok(()) => Some(page),
                Err(failure) => {
                    self.fail(failure);
                    None
                }
            },
            Err(err) => {
                self.fail_request(&err);
                None
            }
        }
    }
}
