//! Error types and handling infrastructure for tiltmaze.
//!
//! The gesture and lifecycle core is total and never fails on valid use. Errors come from
//! the ambient shell: reading configuration, persisting snapshots, and driving the terminal.
//! A lifecycle call on a destroyed coordinator is the one programming defect surfaced here.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tiltmaze operations.
#[derive(Error, Debug)]
pub enum TiltMazeError {
    /// File system related errors (snapshot or config file access)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed or holds invalid values
    #[error("Configuration error in {path}: {message}")]
    ConfigError { path: PathBuf, message: String },

    /// Saved snapshot could not be decoded or encoded
    #[error("Snapshot error: {message}")]
    SnapshotError { message: String },

    /// Lifecycle operation issued after the coordinator was destroyed
    #[error("Lifecycle violation: {operation} called after destroy")]
    LifecycleError { operation: &'static str },

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    UIError { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for tiltmaze operations.
pub type Result<T> = std::result::Result<T, TiltMazeError>;

impl TiltMazeError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a ConfigError for the given config file
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a SnapshotError with a descriptive message
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::SnapshotError {
            message: message.into(),
        }
    }

    /// Create a LifecycleError naming the rejected operation
    pub fn lifecycle(operation: &'static str) -> Self {
        Self::LifecycleError { operation }
    }

    /// Create a UIError with a descriptive message
    pub fn ui(message: impl Into<String>) -> Self {
        Self::UIError {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TiltMazeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let config = TiltMazeError::config("/tmp/config.toml", "unknown field `speed`");
        assert_eq!(
            config.to_string(),
            "Configuration error in /tmp/config.toml: unknown field `speed`"
        );

        let lifecycle = TiltMazeError::lifecycle("resume");
        assert_eq!(
            lifecycle.to_string(),
            "Lifecycle violation: resume called after destroy"
        );

        let snapshot = TiltMazeError::snapshot("missing key `map`");
        assert_eq!(snapshot.to_string(), "Snapshot error: missing key `map`");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: TiltMazeError = io_err.into();

        match err {
            TiltMazeError::FileError { message, .. } => {
                assert_eq!(message, "Permission denied");
            }
            _ => panic!("Expected FileError variant"),
        }
    }
}
