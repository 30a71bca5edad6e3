//! Collaborator contracts the export pipeline calls into.
//!
//! Platform specifics (consent prompts, the address book, the filesystem,
//! share targets) live behind these traits.

use async_trait::async_trait;

use super::error::Result;
use super::models::{ContactFields, ContactRecord, Location, PermissionState};

/// Source of truth for the contact-store access grant.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Probes the live grant status.
    ///
    /// # Errors
    /// Returns `AppError::Probe` if the check cannot complete.
    async fn get_status(&self) -> Result<PermissionState>;

    /// Asks for consent and reports the resulting status.
    ///
    /// # Errors
    /// Returns `AppError::Request` if the prompt cannot be shown.
    async fn request_status(&self) -> Result<PermissionState>;
}

/// Address-book reader.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Reads every contact, ordered ascending by first name.
    ///
    /// # Errors
    /// Returns `AppError::Acquisition` if the read fails.
    async fn fetch_all(&self, fields: ContactFields) -> Result<Vec<ContactRecord>>;
}

/// Persists an encoded export.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// # Errors
    /// Returns `AppError::Write` or `AppError::DirectoryPermission`.
    async fn write(&self, filename: &str, content: &str, mime_type: &str) -> Result<Location>;
}

/// Hands a persisted file to a share target.
#[async_trait]
pub trait ShareSink: Send + Sync {
    async fn is_available(&self) -> bool;

    /// # Errors
    /// Returns an error if the share target fails after being available.
    async fn share(&self, location: &Location, mime_type: &str, dialog_title: &str) -> Result<()>;
}
