//! Domain-level error types for contact-export.
//!
//! All errors are typed with `thiserror`. The permission, data and export
//! layers each own their variants; config, IO and JSON failures share the
//! rest.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// The permission status could not be probed.
    #[error("Failed to check permission status: {message}")]
    Probe { message: String },

    /// The consent prompt could not be shown or its answer not recorded.
    #[error("Failed to request permission: {message}")]
    Request { message: String },

    /// Contact access was attempted without a grant.
    #[error("Please grant contact permission first")]
    PermissionRequired,

    /// Reading the contact store failed.
    #[error("Failed to read contacts: {message}")]
    Acquisition {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing the export file failed.
    #[error("Failed to write {path}: {message}")]
    Write {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Access to the output directory was refused.
    #[error("Storage access not granted: {path}")]
    DirectoryPermission { path: PathBuf },

    /// JSON serialization failed.
    #[error("JSON error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create an acquisition error wrapping the underlying read failure.
    pub fn acquisition(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Acquisition {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a write error for the given target path.
    pub fn write(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a JSON error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
