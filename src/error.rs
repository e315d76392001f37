//! Error types for the search archiver
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the search archiver
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: f64 },

    #[error("Max errors ({max_errors}) reached, last error: {last}")]
    MaxErrorsExceeded { max_errors: u32, last: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Message at position {index} has no id")]
    MissingMessageId { index: usize },

    #[error("Snowflake conversion failed: {message}")]
    Snowflake { message: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a snowflake error
    pub fn snowflake(message: impl Into<String>) -> Self {
        Self::Snowflake {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error is a configuration problem (fatal at startup)
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
        )
    }

    /// Check if this error is retryable
    ///
    /// Rate limits are always retried. Transport failures and unexpected
    /// statuses are retried against the error budget; anything else
    /// (e.g. an unparseable 200 body) ends the fetch.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::RateLimited { .. } | Error::HttpStatus { .. }
        )
    }
}

/// Result type alias for the search archiver
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("guild_id");
        assert_eq!(err.to_string(), "Missing required config field: guild_id");

        let err = Error::http_status(403, "Missing Access");
        assert_eq!(err.to_string(), "HTTP 403: Missing Access");

        let err = Error::MaxErrorsExceeded {
            max_errors: 5,
            last: "HTTP 500: ".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Max errors (5) reached, last error: HTTP 500: "
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 1.5
        }
        .is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(403, "").is_retryable());

        assert!(!Error::config("test").is_retryable());
        assert!(!Error::decode("bad body").is_retryable());
        assert!(!Error::MissingMessageId { index: 0 }.is_retryable());
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("x").is_config());
        assert!(Error::missing_field("DISCORD_TOKEN").is_config());
        assert!(Error::invalid_value("after", "bad date").is_config());
        assert!(!Error::http_status(500, "").is_config());
    }
}
