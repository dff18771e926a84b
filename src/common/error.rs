//! Error handling module
//!
//! This module defines the error type returned by the application entry
//! points, wrapping the configuration errors.

use std::io;
use thiserror::Error;

use crate::config::ConfigError;

/// Tunnel settings error type
#[derive(Error, Debug)]
pub enum Error {
    /// Settings could not be resolved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `Error`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::Unresolved {
            category: "System",
            field: "timezone",
        };
        let err: Error = config_err.into();

        match err {
            Error::Config(_) => {}
            _ => panic!("Should convert to configuration error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed").into();
        assert_eq!(err.to_string(), "IO error: stdout closed");

        let err: Error = ConfigError::validation("Firewall", "outbound subnets", "0.0.0.0/0 is too wide").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Firewall settings: outbound subnets is not valid: 0.0.0.0/0 is too wide"
        );
    }
}
