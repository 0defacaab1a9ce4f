//! Harness configuration
//!
//! Configuration is loaded from environment variables. Unparsable values are
//! ignored and the default is kept.

use std::env;
use std::time::Duration;

/// Main harness configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the target service (no trailing slash needed)
    pub endpoint: String,
    /// Workload dial controlling the number of simulated users
    pub workload: usize,
    /// How long every worker keeps issuing requests
    pub duration: Duration,
    /// Seed for the per-worker random sources (OS entropy when unset)
    pub seed: Option<u64>,
    /// How the binary renders the final result
    pub output: OutputFormat,

    /// Request execution configuration
    pub request: RequestConfig,

    /// Target contract configuration
    pub target: TargetConfig,
}

/// Per-request configuration shared by every worker's executor
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Hard deadline for one request, redirects included
    pub timeout: Duration,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Maximum redirect hops followed before giving up
    pub max_redirects: usize,
    /// Log every request with its status and elapsed time
    pub access_log: bool,
}

/// Details of the target service's external contract
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Name of the session cookie the target issues
    pub session_cookie: String,
    /// Number of memos the target lists per page
    pub memos_per_page: usize,
    /// Pause between static asset requests in the static-load scenario
    pub static_sleep: Duration,
    /// Delay before following the redirect after posting a memo
    pub settle_delay: Duration,
}

/// Output format for the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost".to_string(),
            workload: 1,
            duration: Duration::from_secs(60),
            seed: None,
            output: OutputFormat::Text,
            request: RequestConfig::default(),
            target: TargetConfig::default(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            user_agent: "ISUCON Agent 2013".to_string(),
            max_redirects: 10,
            access_log: false,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            session_cookie: "isucon_session".to_string(),
            memos_per_page: 100,
            static_sleep: Duration::from_millis(10),
            settle_delay: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = env::var("BENCH_ENDPOINT")
            && !endpoint.is_empty()
        {
            config.endpoint = endpoint;
        }
        if let Ok(val) = env::var("BENCH_WORKLOAD")
            && let Ok(w) = val.parse()
        {
            config.workload = w;
        }
        if let Ok(val) = env::var("BENCH_SECONDS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.duration = Duration::from_secs(secs);
        }
        if let Ok(val) = env::var("BENCH_SEED")
            && let Ok(seed) = val.parse()
        {
            config.seed = Some(seed);
        }
        if let Ok(val) = env::var("BENCH_OUTPUT") {
            config.output = match val.to_lowercase().as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Text,
            };
        }

        // Request config
        if let Ok(val) = env::var("BENCH_TIMEOUT_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.request.timeout = Duration::from_millis(ms);
        }
        if let Ok(agent) = env::var("BENCH_USER_AGENT")
            && !agent.is_empty()
        {
            config.request.user_agent = agent;
        }
        if let Ok(val) = env::var("BENCH_ACCESS_LOG") {
            config.request.access_log = val.to_lowercase() == "true" || val == "1";
        }

        // Target config
        if let Ok(name) = env::var("BENCH_SESSION_COOKIE")
            && !name.is_empty()
        {
            config.target.session_cookie = name;
        }

        config
    }
}
