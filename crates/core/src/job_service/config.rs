//! Configuration for the external job service client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the document conversion job service.
///
/// The service is optional: without an API key, delegation is disabled and
/// conversions that would use it produce a placeholder document instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobServiceConfig {
    /// API key. Also read from `CLOUDCONVERT_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the service API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Conversion engine requested for the convert task.
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Timeout for a single HTTP request in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum time to wait for a job to reach a terminal state, in seconds.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,

    /// Polling backoff.
    #[serde(default)]
    pub poll: PollConfig,

    /// Attempts per conversion, including the first. 1 disables retry.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Exponential backoff between status polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay before the second poll, in milliseconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Upper bound for a single delay, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Factor applied to the delay after each poll.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_base_url() -> String {
    "https://api.cloudconvert.com".to_string()
}

fn default_engine() -> String {
    "office".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_wait_timeout() -> u64 {
    300 // 5 minutes
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    5000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl Default for JobServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            engine: default_engine(),
            request_timeout_secs: default_request_timeout(),
            wait_timeout_secs: default_wait_timeout(),
            poll: PollConfig::default(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl JobServiceConfig {
    /// Creates a config with the given API key and defaults elsewhere.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the wait timeout in seconds.
    pub fn with_wait_timeout(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = secs;
        self
    }

    /// Sets the polling backoff.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the number of attempts per conversion.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// The API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}
