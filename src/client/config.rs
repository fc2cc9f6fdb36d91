//! Configuration management for the realtime client

use std::{path::PathBuf, time::Duration};

use compact_str::CompactString;

use super::error::{ClientError, Result};
use crate::config::WatchConfig;

/// Main configuration for the realtime client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Portal origin, e.g. `https://jobs.example.com`
    pub base_url: CompactString,
    /// Session cookie (`name=value`) sent with every request
    pub session_cookie: Option<CompactString>,
    /// Polling configuration
    pub polling: PollingConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Debug configuration
    pub debug: DebugConfig,
}

/// Polling interval configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PollingConfig {
    /// Delay between poll cycles
    pub interval: Duration,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout
    pub timeout: Duration,
}

/// Debug and logging configuration
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Write raw response bodies to files
    pub log_responses: bool,
    /// Directory for storing response dumps
    pub log_directory: Option<PathBuf>,
}

impl PollingConfig {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10_000);
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval: Self::DEFAULT_INTERVAL }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30) }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_responses: false,
            log_directory: Some(PathBuf::from("jobwatch-logs")),
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<CompactString>) -> Self {
        Self {
            base_url: base_url.into(),
            session_cookie: None,
            polling: PollingConfig::default(),
            request: RequestConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::config_validation(
                "base_url",
                "Base URL cannot be empty",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::config_validation(
                "base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(ClientError::config_validation(
                "base_url",
                "Base URL is not a valid URL format",
            ));
        }

        if let Some(cookie) = &self.session_cookie {
            let name = cookie.split('=').next().unwrap_or_default().trim();
            if !cookie.contains('=') || name.is_empty() {
                return Err(ClientError::config_validation(
                    "session_cookie",
                    "Session cookie must look like name=value",
                ));
            }
        }

        if self.polling.interval.is_zero() {
            return Err(ClientError::config_validation(
                "interval_ms",
                "Polling interval must be greater than zero",
            ));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Base URL parsed, with any trailing slash removed from the path
    pub fn origin(&self) -> Result<url::Url> {
        url::Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|_| ClientError::invalid_url(self.base_url.clone()))
    }
}

impl From<WatchConfig> for ClientConfig {
    fn from(config: WatchConfig) -> Self {
        Self::new(config.base_url)
            .with_session_cookie(config.session_cookie)
            .with_polling(PollingConfig {
                interval: Duration::from_millis(config.interval_ms),
            })
            .with_request(RequestConfig {
                timeout: Duration::from_millis(config.request_timeout_ms),
            })
            .with_debug_logging(config.log_responses)
    }
}

impl ClientConfig {
    /// Set session cookie
    pub fn with_session_cookie(mut self, cookie: Option<CompactString>) -> Self {
        self.session_cookie = cookie;
        self
    }

    /// Set polling configuration
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }

    /// Enable debug logging of response bodies
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug.log_responses = enabled;
        self
    }
}
