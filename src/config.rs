//! Service configuration consumed from the surrounding process.
//!
//! The dispatch core does not own credential storage: the API key, base URL
//! and default model arrive from process configuration (environment variables
//! in the reference deployment) and are injected at construction time.

use std::env;
use std::time::Duration;

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Default model id when the deployment does not pick one.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Minimum spacing between outbound provider calls.
pub const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Per-task request deadline when the caller does not supply one.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Configuration for an [`AiService`](crate::service::AiService) instance.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Provider API key. `None` leaves the service in a not-initialized
    /// state: every `process` call reports service-unavailable.
    pub api_key: Option<String>,
    /// Provider base URL, without a trailing slash.
    pub base_url: String,
    /// Model substituted for missing or unknown model ids.
    pub default_model: String,
    /// Minimum spacing enforced between outbound provider calls.
    pub min_request_interval: Duration,
    /// Fallback request deadline for tasks without `timeout_seconds`.
    pub request_timeout: Duration,
}

impl ServiceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Read configuration from the environment.
    ///
    /// `DEEPSEEK_API_KEY`, `DEEPSEEK_API_BASE`, `DEEPSEEK_DEFAULT_MODEL`,
    /// `AI_MIN_REQUEST_INTERVAL_MS` and `AI_REQUEST_TIMEOUT` are honored;
    /// everything absent falls back to the defaults above.
    pub fn from_env() -> Self {
        let api_key = env::var("DEEPSEEK_API_KEY").ok().filter(|k| !k.is_empty());

        let base_url = env::var("DEEPSEEK_API_BASE")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let default_model = env::var("DEEPSEEK_DEFAULT_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let min_request_interval = env::var("AI_MIN_REQUEST_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_MIN_REQUEST_INTERVAL);

        let request_timeout = env::var("AI_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        Self {
            api_key,
            base_url,
            default_model,
            min_request_interval,
            request_timeout,
        }
    }

    /// Normalized base URL (trailing slash stripped so path joins are stable).
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
