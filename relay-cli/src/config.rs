//! Configuration module
//!
//! Defines everything the pipeline needs to reach the remote repository,
//! recognise its runs and bound how long it waits for them. All settings
//! come from environment variables; the binary accepts no arguments.

use std::fmt;
use std::time::Duration;

use relay_client::{DEFAULT_API_URL, DEFAULT_MAX_REDIRECTS, DEFAULT_REQUEST_TIMEOUT};
use relay_core::domain::repository::Repository;
use relay_core::extract::DEFAULT_LOG_ENTRIES;
use relay_core::retry::{DEFAULT_INTERVAL, DEFAULT_MAX_ELAPSED, RetryPolicy};

/// Environment variables listed in `--help`
pub const ENV_HELP: &str = "\
Environment:
  GITHUB_TOKEN               API token (required)
  RELAY_REPOSITORY           owner/name receiving the dispatch (required)
  GITHUB_API_URL             API base URL [default: https://api.github.com]
  RELAY_WORKFLOW             workflow file whose runs are listed [default: dispatch.yml]
  RELAY_EVENT_TYPE           repository_dispatch event type [default: test]
  RELAY_RUN_NAME_PREFIX      run name prefix, runs are named <prefix>[<uuid>] [default: dispatch_test]
  RELAY_POLL_INTERVAL        seconds between polls [default: 5]
  RELAY_LOCATE_TIMEOUT       seconds to wait for the run to appear [default: 600]
  RELAY_WAIT_TIMEOUT         seconds to wait for the run to complete [default: 600]
  RELAY_REQUEST_TIMEOUT      seconds before a single HTTP request is abandoned [default: 30]
  RELAY_LOG_ATTEMPT_OFFSET   added to the run attempt when fetching logs [default: 0]
  RELAY_LOG_MAX_REDIRECTS    permanent redirects followed for the log bundle [default: 2]
  RELAY_LOG_ENTRIES          comma-separated log files searched for output
                             [default: plan/5_Validate.txt,plan/7_Command.txt]";

/// Event kind of runs started through a repository dispatch
pub const DISPATCH_EVENT: &str = "repository_dispatch";

/// Relay configuration
#[derive(Clone)]
pub struct Config {
    /// GitHub API base URL
    pub api_url: String,

    /// API token
    pub token: String,

    /// Repository receiving the dispatch
    pub repository: Repository,

    /// Workflow file whose runs are listed (e.g., "dispatch.yml")
    pub workflow: String,

    /// `event_type` of the dispatch
    pub event_type: String,

    /// Runs are named `<prefix>[<token>]`
    pub run_name_prefix: String,

    /// Delay between polls while locating and waiting
    pub poll_interval: Duration,

    /// How long to wait for the dispatched run to be listed
    pub locate_timeout: Duration,

    /// How long to wait for the located run to complete
    pub wait_timeout: Duration,

    /// Upper bound on each HTTP request
    pub request_timeout: Duration,

    /// Added to the run attempt number when requesting the log bundle
    pub log_attempt_offset: i64,

    /// Permanent redirects followed when resolving the log bundle location
    pub log_max_redirects: u32,

    /// Log entries searched for the output block, in order
    pub log_entries: Vec<String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(repository: Repository, token: String) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token,
            repository,
            workflow: "dispatch.yml".to_string(),
            event_type: "test".to_string(),
            run_name_prefix: "dispatch_test".to_string(),
            poll_interval: DEFAULT_INTERVAL,
            locate_timeout: DEFAULT_MAX_ELAPSED,
            wait_timeout: DEFAULT_MAX_ELAPSED,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_attempt_offset: 0,
            log_max_redirects: DEFAULT_MAX_REDIRECTS,
            log_entries: DEFAULT_LOG_ENTRIES.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// See [`ENV_HELP`] for the variables and their defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let token = lookup("GITHUB_TOKEN")
            .ok_or_else(|| anyhow::anyhow!("GITHUB_TOKEN environment variable not set"))?;

        let repository = lookup("RELAY_REPOSITORY")
            .ok_or_else(|| anyhow::anyhow!("RELAY_REPOSITORY environment variable not set"))?
            .parse::<Repository>()?;

        let mut config = Self::new(repository, token);

        if let Some(api_url) = lookup("GITHUB_API_URL") {
            config.api_url = api_url;
        }
        if let Some(workflow) = lookup("RELAY_WORKFLOW") {
            config.workflow = workflow;
        }
        if let Some(event_type) = lookup("RELAY_EVENT_TYPE") {
            config.event_type = event_type;
        }
        if let Some(prefix) = lookup("RELAY_RUN_NAME_PREFIX") {
            config.run_name_prefix = prefix;
        }

        let seconds = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };
        config.poll_interval = seconds("RELAY_POLL_INTERVAL", config.poll_interval);
        config.locate_timeout = seconds("RELAY_LOCATE_TIMEOUT", config.locate_timeout);
        config.wait_timeout = seconds("RELAY_WAIT_TIMEOUT", config.wait_timeout);
        config.request_timeout = seconds("RELAY_REQUEST_TIMEOUT", config.request_timeout);

        config.log_attempt_offset = lookup("RELAY_LOG_ATTEMPT_OFFSET")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0);

        config.log_max_redirects = lookup("RELAY_LOG_MAX_REDIRECTS")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_REDIRECTS);

        if let Some(entries) = lookup("RELAY_LOG_ENTRIES") {
            config.log_entries = entries
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token.is_empty() {
            anyhow::bail!("GITHUB_TOKEN cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.workflow.is_empty() {
            anyhow::bail!("workflow cannot be empty");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.locate_timeout.is_zero() || self.wait_timeout.is_zero() {
            anyhow::bail!("locate and wait timeouts must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.log_entries.is_empty() {
            anyhow::bail!("log_entries cannot be empty");
        }

        Ok(())
    }

    /// Retry policy for locating the dispatched run
    pub fn locate_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.poll_interval, self.locate_timeout)
    }

    /// Retry policy for waiting on run completion
    pub fn wait_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.poll_interval, self.wait_timeout)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("workflow", &self.workflow)
            .field("event_type", &self.event_type)
            .field("run_name_prefix", &self.run_name_prefix)
            .field("poll_interval", &self.poll_interval)
            .field("locate_timeout", &self.locate_timeout)
            .field("wait_timeout", &self.wait_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("log_attempt_offset", &self.log_attempt_offset)
            .field("log_max_redirects", &self.log_max_redirects)
            .field("log_entries", &self.log_entries)
            .finish()
    }
}
