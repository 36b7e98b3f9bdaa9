//! Error types for Footprint.
//!
//! Library crates use [`FootprintError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Footprint operations.
#[derive(Debug, thiserror::Error)]
pub enum FootprintError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure: connect, timeout, or body read.
    #[error("network error: {0}")]
    Network(String),

    /// A remote API answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// A remote API reported that the requested resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// A structured query succeeded at the transport level but the payload
    /// reported a logical error (e.g. GraphQL `errors`).
    #[error("query error: {0}")]
    Query(String),

    /// Response payload could not be decoded into the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (invalid format, out-of-range value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FootprintError>;

impl FootprintError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error for the named resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
