use std::path::PathBuf;

use compact_str::{CompactString, ToCompactString};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Debug, Clone, Error)]
pub enum WatchError {
    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoadError { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    ConfigSaveError { path: PathBuf, message: String },

    #[error("Invalid configuration for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{0}")]
    GeneralError(CompactString),
}

impl From<crate::client::ClientError> for WatchError {
    fn from(e: crate::client::ClientError) -> Self {
        use crate::client::ClientError;

        match e {
            ClientError::ConfigValidation { field, message } => {
                WatchError::config_validation_error(field, message)
            },
            other => WatchError::GeneralError(other.to_compact_string()),
        }
    }
}

impl WatchError {
    /// Create a configuration load error
    pub fn config_load_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::ConfigLoadError { path, message: source.to_string() }
    }

    /// Create a configuration save error
    pub fn config_save_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::ConfigSaveError { path, message: source.to_string() }
    }

    /// Create a configuration validation error
    pub fn config_validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidationError { field: field.into(), message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;

    #[test]
    fn client_validation_errors_keep_their_field() {
        let err = WatchError::from(ClientError::config_validation("base_url", "must not be empty"));

        match err {
            WatchError::ConfigValidationError { field, .. } => assert_eq!(field, "base_url"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn other_client_errors_become_general_errors() {
        let err = WatchError::from(ClientError::Unauthorized { status: 401 });
        assert!(matches!(err, WatchError::GeneralError(message) if message.contains("401")));
    }
}
