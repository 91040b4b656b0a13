//! Error types for herodex.
//!
//! Library crates use [`HerodexError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all herodex operations.
#[derive(Debug, thiserror::Error)]
pub enum HerodexError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page or policy document.
    #[error("network error: {0}")]
    Network(String),

    /// The crawl policy of the source host disallows the URL.
    #[error("fetch disallowed by crawl policy: {url}")]
    PolicyDenied { url: String },

    /// Markup parsing or record extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, malformed schedule, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HerodexError>;

impl HerodexError {
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

    /// Create a policy-denied error for a URL.
    pub fn policy_denied(url: impl Into<String>) -> Self {
        Self::PolicyDenied { url: url.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = HerodexError::config("missing base_url");
        assert_eq!(err.to_string(), "config error: missing base_url");

        let err = HerodexError::policy_denied("https://wiki.example.com/wiki/Hela");
        assert!(err.to_string().contains("crawl policy"));
        assert!(err.to_string().ends_with("/wiki/Hela"));
    }
}
