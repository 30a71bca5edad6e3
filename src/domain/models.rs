//! Domain models for contact export.
//!
//! These models represent address-book entries, the permission gate and
//! one export attempt.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Snapshot of one address-book entry at acquisition time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    /// Full display name, may be empty.
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Raw phone numbers, unnormalized.
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    /// Company, empty if absent.
    #[serde(default)]
    pub company: String,
}

/// Fields requested from the contact store.
///
/// Name, phone numbers and emails are always read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFields {
    pub company: bool,
}

impl Default for ContactFields {
    fn default() -> Self {
        Self { company: true }
    }
}

/// Access-grant status for the contact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Undetermined,
    Granted,
    Denied,
}

impl PermissionState {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undetermined => write!(f, "undetermined"),
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Vcf,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Vcf => "vcf",
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Vcf => "text/x-vcard",
        }
    }

    /// Title shown by the share target.
    #[must_use]
    pub const fn dialog_title(self) -> &'static str {
        match self {
            Self::Csv => "Save Contacts CSV",
            Self::Vcf => "Save Contacts VCF",
        }
    }

    /// Upper-case label for user messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Vcf => "VCF",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "vcf" | "vcard" => Ok(Self::Vcf),
            _ => Err(format!("Unknown format: {s}. Use: csv, vcf")),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Handle to a persisted export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(pub PathBuf);

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Lifecycle status of an export job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Succeeded {
        filename: String,
        contact_count: usize,
    },
    Failed {
        message: String,
    },
}

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// One attempt to encode and persist a set of contacts.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub format: ExportFormat,
    pub source_contacts: Vec<ContactRecord>,
    pub status: JobStatus,
    pub produced_filename: Option<String>,
}

impl ExportJob {
    #[must_use]
    pub const fn new(format: ExportFormat, source_contacts: Vec<ContactRecord>) -> Self {
        Self {
            format,
            source_contacts,
            status: JobStatus::Idle,
            produced_filename: None,
        }
    }
}

/// Terminal result of loading contacts from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    NoContacts,
}

/// Terminal result of an export run, as surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// File written. `shared` is false when no share target was available
    /// and only the on-disk location can be reported.
    Exported {
        filename: String,
        location: Location,
        contact_count: usize,
        shared: bool,
    },
    /// The store holds no contacts; nothing was written.
    NoContacts,
    /// Permission was not granted; the pipeline stopped before acquisition.
    PermissionNotGranted(PermissionState),
    /// Another export is already running on this session.
    Busy,
    Failed {
        message: String,
    },
}

impl ExportOutcome {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
