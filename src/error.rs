//! Error types
//!
//! Two layers: [`Error`] for failures that reach the caller (storage,
//! notification, configuration) and [`LookupError`] for transient per-query
//! failures, which the enrichment step swallows.

use thiserror::Error;

/// Result type alias for squatwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller of the pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// A watched domain failed validation
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Storage collaborator failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Notify collaborator failure
    #[error("notify error: {0}")]
    Notify(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid domain error
    pub fn invalid_domain(msg: impl Into<String>) -> Self {
        Self::InvalidDomain(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a notify error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// A single failed lookup. Never propagated past the enrichment step.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The query did not finish before its deadline
    #[error("lookup timed out")]
    Timeout,

    /// The query succeeded but returned no usable answer
    #[error("no answer")]
    NoAnswer,

    /// DNS transport error
    #[error("DNS error: {0}")]
    Dns(String),

    /// WHOIS transport or parse error
    #[error("WHOIS error: {0}")]
    Whois(String),

    /// Banner grab error
    #[error("banner error: {0}")]
    Banner(String),

    /// Network I/O error
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
}
