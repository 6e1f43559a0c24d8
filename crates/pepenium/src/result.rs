//! Result and error types for Pepenium.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Pepenium operations
pub type PepeniumResult<T> = Result<T, PepeniumError>;

/// Errors that can occur in Pepenium
#[derive(Debug, Error)]
pub enum PepeniumError {
    /// A wait condition was not met in time
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element could not be located after scrolling
    #[error("Element not found after {attempts} scroll attempts (or end of list): {locator}")]
    NotFound {
        /// Locator that was searched for
        locator: String,
        /// Attempt budget that was in effect
        attempts: u32,
    },

    /// Single lookup found nothing
    #[error("No such element: {locator}")]
    NoSuchElement {
        /// Locator that was searched for
        locator: String,
    },

    /// Element reference is no longer attached to the UI tree
    #[error("Stale element reference: {message}")]
    StaleElement {
        /// Driver message
        message: String,
    },

    /// Another element would receive the click
    #[error("Element click intercepted: {message}")]
    ClickIntercepted {
        /// Driver message
        message: String,
    },

    /// Any other error reported by the remote end
    #[error("WebDriver error '{code}': {message}")]
    WebDriver {
        /// W3C error code
        code: String,
        /// Driver message
        message: String,
    },

    /// Transport failure talking to the remote end
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Session could not be created or used
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Failed to load {path}: {message}")]
    Config {
        /// File that failed
        path: PathBuf,
        /// Underlying parse or read error
        message: String,
    },

    /// Configuration file has no platform entry
    #[error("No platform entry in {path}")]
    MissingPlatform {
        /// File that failed
        path: PathBuf,
    },

    /// Caller passed a value outside the accepted range
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Locator expression could not be parsed
    #[error("Invalid locator '{input}': expected <strategy>=<value>")]
    InvalidLocator {
        /// Rejected input
        input: String,
    },

    /// Local Appium service failure
    #[error("Appium service error: {message}")]
    Service {
        /// Error message
        message: String,
    },

    /// Screenshot failure
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PepeniumError {
    /// Create a timeout error
    #[must_use]
    pub fn timeout(what: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            ms,
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build the error for a W3C error code
    #[must_use]
    pub fn from_w3c(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "no such element" => Self::NoSuchElement { locator: message },
            "stale element reference" => Self::StaleElement { message },
            "element click intercepted" => Self::ClickIntercepted { message },
            _ => Self::WebDriver {
                code: code.to_string(),
                message,
            },
        }
    }

    /// Errors a polling loop may swallow and retry on
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. } | Self::StaleElement { .. })
    }

    /// Stale element reference
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement { .. })
    }
}
