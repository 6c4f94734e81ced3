//! Error types for timeorder
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Cursor and limit problems are recoverable: pagination degrades to the
//! default behaviour instead of returning them. Source errors are passed
//! through untouched.

use thiserror::Error;

/// The main error type for timeorder
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Request Input Errors
    // ============================================================================
    #[error("Invalid cursor value for '{field}': {value}")]
    InvalidCursorValue { field: String, value: String },

    #[error("Invalid limit: {value}")]
    InvalidLimit { value: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Record Source Errors
    // ============================================================================
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Record source error: {message}")]
    Source { message: String },

    #[error("Record is missing field '{field}'")]
    MissingField { field: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid cursor value error
    pub fn invalid_cursor(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidCursorValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an invalid limit error
    pub fn invalid_limit(value: impl Into<String>) -> Self {
        Self::InvalidLimit {
            value: value.into(),
        }
    }

    /// Create a record source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Check if this error came from the record source
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Source { .. } | Error::MissingField { .. }
        )
    }

    /// Check if this error describes bad request input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidCursorValue { .. } | Error::InvalidLimit { .. } | Error::InvalidUrl(_)
        )
    }
}

/// Result type alias for timeorder
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_cursor("modified", "yesterday");
        assert_eq!(
            err.to_string(),
            "Invalid cursor value for 'modified': yesterday"
        );

        let err = Error::missing_field("id");
        assert_eq!(err.to_string(), "Record is missing field 'id'");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::source("connection reset").is_source_error());
        assert!(Error::missing_field("id").is_source_error());
        assert!(!Error::config("bad").is_source_error());

        assert!(Error::invalid_limit("abc").is_input_error());
        assert!(Error::invalid_cursor("modified", "x").is_input_error());
        assert!(!Error::source("boom").is_input_error());
    }
}
