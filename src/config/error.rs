//! Configuration errors
//!
//! This module defines error types for the configuration module. Every
//! variant names where the offending value came from: the environment
//! variable actually consulted (alias included) or the secret file path.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A port literal is not an integer
    #[error("environment variable {key}: cannot parse port: {value}: {reason}")]
    PortParsing {
        key: String,
        value: String,
        reason: String,
    },

    /// A port integer is outside 1..=65535
    #[error("environment variable {key}: port value is not valid: must be between 1 and 65535: {value}")]
    PortValue { key: String, value: i64 },

    /// An IP network literal could not be parsed
    #[error("environment variable {key}: parsing IP network {value:?}: {reason}")]
    IpNetwork {
        key: String,
        value: String,
        reason: String,
    },

    /// An IP address literal could not be parsed
    #[error("environment variable {key}: parsing IP address {value:?}: {reason}")]
    IpAddress {
        key: String,
        value: String,
        reason: String,
    },

    /// A system ID is not an unsigned integer
    #[error("environment variable {key}: system ID is not valid: {value}: {reason}")]
    IdParsing {
        key: String,
        value: String,
        reason: String,
    },

    /// A system ID does not fit in 32 bits
    #[error("environment variable {key}: system ID is not valid: {value}: must be between 0 and {max}")]
    IdRange { key: String, value: u64, max: u32 },

    /// A boolean literal is not recognised
    #[error("environment variable {key}: {value:?} is not a valid boolean")]
    Bool { key: String, value: String },

    /// A duration literal is not recognised
    #[error("environment variable {key}: {value:?} is not a valid duration: {reason}")]
    Duration {
        key: String,
        value: String,
        reason: String,
    },

    /// A secret file exists but could not be read
    #[error("reading secret file {}: {source}", path.display())]
    SecretFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A secret file path was set explicitly but nothing is there
    #[error("secret file {} set by {key} does not exist", path.display())]
    SecretFileNotFound { key: String, path: PathBuf },

    /// PEM content could not be turned into its base64 body
    #[error("extracting base64 encoded data from PEM content of {}: {reason}", path.display())]
    Pem { path: PathBuf, reason: String },

    /// A resolved value failed a semantic check
    #[error("{category} settings: {field} is not valid: {message}")]
    Validation {
        category: &'static str,
        field: &'static str,
        message: String,
    },

    /// A field is still absent where a resolved value is required
    #[error("{category} settings: {field} is not set")]
    Unresolved {
        category: &'static str,
        field: &'static str,
    },
}

impl ConfigError {
    /// Build a validation error for a field of a settings category
    pub fn validation(
        category: &'static str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::Validation {
            category,
            field,
            message: message.into(),
        }
    }

    /// Source name the error is attributed to, if it came from the environment
    pub fn env_key(&self) -> Option<&str> {
        match self {
            ConfigError::PortParsing { key, .. }
            | ConfigError::PortValue { key, .. }
            | ConfigError::IpNetwork { key, .. }
            | ConfigError::IpAddress { key, .. }
            | ConfigError::IdParsing { key, .. }
            | ConfigError::IdRange { key, .. }
            | ConfigError::Bool { key, .. }
            | ConfigError::Duration { key, .. }
            | ConfigError::SecretFileNotFound { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_source() {
        let err = ConfigError::IdRange {
            key: "UID".to_string(),
            value: 99999999999,
            max: u32::MAX,
        };
        let msg = err.to_string();
        assert!(msg.contains("UID"));
        assert!(msg.contains("4294967295"));
        assert_eq!(err.env_key(), Some("UID"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::validation("HTTP proxy", "listening address", "port missing");
        assert_eq!(
            err.to_string(),
            "HTTP proxy settings: listening address is not valid: port missing"
        );
        assert_eq!(err.env_key(), None);
    }
}
