//! Client configuration (environment-driven).

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

pub const ENV_API_URL: &str = "EVENTDESK_API_URL";
pub const ENV_TIMEOUT_MS: &str = "EVENTDESK_TIMEOUT_MS";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "EVENTDESK_SEARCH_DEBOUNCE_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash (e.g. `http://localhost:8080/api`).
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Quiet interval before a remote search fires.
    pub search_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl ClientConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Invalid values fall
    /// back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup(ENV_API_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                tracing::debug!("{ENV_API_URL} not set; using {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });

        Self {
            timeout: millis(&lookup, ENV_TIMEOUT_MS, DEFAULT_TIMEOUT),
            search_debounce: millis(&lookup, ENV_SEARCH_DEBOUNCE_MS, DEFAULT_SEARCH_DEBOUNCE),
            ..Self::default()
        }
        .with_api_url(api_url)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_search_debounce(mut self, quiet: Duration) -> Self {
        self.search_debounce = quiet;
        self
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!("{key}={raw:?} is not a number of milliseconds; using {default:?}");
                default
            }
        },
    }
}
