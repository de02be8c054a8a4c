//! Error types shared by every builder in the crate.

use thiserror::Error;

/// Errors raised while configuring or serializing a document.
///
/// Configuration errors are raised as soon as an invalid value is handed to a
/// builder (or, for lazily checked invariants, when the builder is rendered).
/// Usage errors signal a structurally invalid composition.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid value was supplied, e.g. a blank package name or a float
    /// position the environment does not understand.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Builders were combined in a way that cannot be rendered.
    #[error("usage error: {0}")]
    Usage(String),

    /// Reading or writing a persisted configuration failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted configuration could not be (de)serialized.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }
}

/// Convenience alias used throughout `texforge-core`.
pub type Result<T> = std::result::Result<T, Error>;
