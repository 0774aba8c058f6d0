//! Result and error types for Shop Probe.

use thiserror::Error;

/// Result type for Shop Probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving pages or seeding fixtures
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A required lookup (parent label, tree, collection item) found nothing
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked for
        what: String,
    },

    /// An element needed for an action is not on the page
    #[error("{element} not found")]
    ElementNotFound {
        /// Description of the missing element
        element: String,
    },

    /// An asynchronous UI transition did not settle in time
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the awaited condition
        waited_for: String,
    },

    /// Invalid argument passed to a page operation
    #[error("Validation failed: {message}")]
    Validation {
        /// Error message
        message: String,
    },

    /// A handle refers to an element that left the document
    #[error("Stale element {id}: it is no longer attached to the page")]
    StaleElement {
        /// Handle identifier
        id: String,
    },

    /// A selector could not be parsed
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// The selector source
        selector: String,
        /// Parse error
        message: String,
    },

    /// Driver-level failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Fixture error (seeding or shared storage failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
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

impl ProbeError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an element-not-found error
    #[must_use]
    pub fn element_not_found(element: impl Into<String>) -> Self {
        Self::ElementNotFound {
            element: element.into(),
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }
}
