//! Error types for the realtime client

use compact_str::CompactString;
use thiserror::Error;

use crate::domain::FeedStream;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connect, timeout, body read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error from {endpoint}: {message}")]
    JsonParse {
        endpoint: CompactString,
        message: CompactString,
        #[source]
        source: serde_json::Error,
    },

    /// 401, no valid session
    #[error("Not authenticated (HTTP {status})")]
    Unauthorized { status: u16 },

    /// 403, session lacks the role for this endpoint
    #[error("Forbidden (HTTP {status}): {message}")]
    Forbidden { status: u16, message: CompactString },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: CompactString },

    /// Response parsed but breaks the cursor contract
    #[error("Invalid {stream} feed: {message}")]
    InvalidFeed { stream: FeedStream, message: CompactString },

    #[error("Configuration error: {0}")]
    Config(CompactString),

    #[error("Invalid configuration for {field}: {message}")]
    ConfigValidation { field: CompactString, message: CompactString },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: CompactString },
}

impl ClientError {
    pub fn json_parse(
        endpoint: impl Into<CompactString>,
        message: impl Into<CompactString>,
        source: serde_json::Error,
    ) -> Self {
        Self::JsonParse {
            endpoint: endpoint.into(),
            message: message.into(),
            source,
        }
    }

    pub fn api(status: u16, message: impl Into<CompactString>) -> Self {
        Self::Api { status, message: message.into() }
    }

    pub fn invalid_feed(stream: FeedStream, message: impl Into<CompactString>) -> Self {
        Self::InvalidFeed { stream, message: message.into() }
    }

    pub fn config(message: impl Into<CompactString>) -> Self {
        Self::Config(message.into())
    }

    pub fn config_validation(
        field: impl Into<CompactString>,
        message: impl Into<CompactString>,
    ) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }

    pub fn invalid_url(url: impl Into<CompactString>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status }
            | Self::Forbidden { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error only means "nothing for you on this stream right now"
    pub fn is_unauthorized_for(&self, stream: FeedStream) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Forbidden { .. })
            && self
                .status()
                .is_some_and(|status| stream.is_unauthorized_status(status))
    }
}
