//! Error types for the triage workspace.
//!
//! Library crates use [`TriageError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all triage operations.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Document could not be interpreted at all (e.g. not valid UTF-8).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid rule table, filter order, or other bad input data.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// External command failure during a latency probe.
    #[error("probe error: {0}")]
    Probe(String),

    /// JSON or TOML serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
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
        let err = TriageError::config("unknown category 'bugs'");
        assert_eq!(err.to_string(), "config error: unknown category 'bugs'");

        let err = TriageError::validation("filter order lists 'duplicate' twice");
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn io_error_includes_path() {
        let err = TriageError::io(
            "docs/issues/12.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("docs/issues/12.md"));
        assert!(msg.contains("gone"));
    }
}
