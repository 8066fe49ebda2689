use std::time::Duration;

use serde::Deserialize;

use crate::poll::PollPolicy;

/// Generative-AI client configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct GenAiConfig {
    /// API key sent as `x-goog-api-key`.
    #[serde(default)]
    pub api_key: String,
    /// API root. Default: "https://generativelanguage.googleapis.com".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for every generation call. Default: "gemini-2.5-flash".
    #[serde(default = "default_model")]
    pub model: String,
    /// Seconds between file status checks. Default: 5.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Status checks before giving up on a file. Default: 60.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Grow the poll interval exponentially instead of keeping it fixed.
    #[serde(default)]
    pub poll_backoff: bool,
    /// Timeout of a single HTTP request. Default: 120.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_max_poll_attempts() -> u32 {
    60
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            poll_backoff: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GenAiConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_poll_attempts.max(1),
            backoff: self.poll_backoff,
            max_interval: Duration::from_secs(60),
        }
    }
}
