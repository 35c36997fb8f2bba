//! Layered error definitions
//!
//! Categorized by source: config / destination / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Destination Errors =====
    /// Destination could not be opened
    #[error("destination '{destination}' open error: {message}")]
    DestinationOpen {
        destination: String,
        message: String,
    },

    /// Destination close error
    #[error("destination '{destination}' close error: {message}")]
    DestinationClose {
        destination: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create destination open error
    pub fn destination_open(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DestinationOpen {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Create destination close error
    pub fn destination_close(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DestinationClose {
            destination: destination.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ContractError::config_validation("filters[0].level", "unknown level 'LOUD'");
        assert_eq!(
            err.to_string(),
            "config validation error at 'filters[0].level': unknown level 'LOUD'"
        );

        let err = ContractError::destination_close("file", "disk full");
        assert!(err.to_string().contains("disk full"));
    }
}
