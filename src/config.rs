//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Connection settings for the Manugen backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g. "http://localhost:8000").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connect timeout for the shared HTTP client, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Deadline for non-streaming requests, in seconds.
    ///
    /// Streaming requests stay open for the lifetime of the event stream
    /// and carry no deadline.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Session creation retry policy.
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Bounded fixed-delay retry policy for session creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Creation attempts allowed after the first one fails.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    120
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay between creation attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Configuration pointing at `base_url`, defaults elsewhere.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.retry.max_retries, 120);
        assert_eq!(config.retry.retry_delay_ms, 1000);
        assert_eq!(config.retry.retry_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://backend:9000\"").unwrap();
        writeln!(file, "[retry]").unwrap();
        writeln!(file, "max_retries = 3").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.retry.max_retries, 3);
        // Unset fields keep their defaults
        assert_eq!(config.retry.retry_delay_ms, 1000);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_from_missing_file() {
        let result = ClientConfig::from_file(Path::new("/nonexistent/manugen.toml"));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_with_base_url() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:1234");
        assert_eq!(config.base_url, "http://127.0.0.1:1234");
        assert_eq!(config.retry.max_retries, 120);
    }
}
