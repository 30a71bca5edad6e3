//! Application configuration model.
//!
//! Deserialized from `config.toml` with per-field defaults so that a
//! partial file is always valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::models::ExportFormat;

/// Contact store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// Address-book database file.
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Whether to read the company field.
    #[serde(default = "default_include_company")]
    pub include_company: bool,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            database: None,
            include_company: default_include_company(),
        }
    }
}

const fn default_include_company() -> bool {
    true
}

/// Export destination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory export files are written to.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Format used when none is given on the command line.
    #[serde(default)]
    pub default_format: ExportFormat,

    /// Create the output directory when missing.
    #[serde(default = "default_create_output_dir")]
    pub create_output_dir: bool,

    /// Program that receives the exported file path (e.g. `xdg-open`).
    #[serde(default)]
    pub share_command: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            default_format: ExportFormat::default(),
            create_output_dir: default_create_output_dir(),
            share_command: None,
        }
    }
}

const fn default_create_output_dir() -> bool {
    true
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub contacts: ContactsConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".contact-export")
    }

    #[must_use]
    pub fn contacts_db_path(&self) -> PathBuf {
        self.contacts
            .database
            .clone()
            .unwrap_or_else(|| self.data_dir().join("contacts.db"))
    }

    #[must_use]
    pub fn exports_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("exports"))
    }

    /// Persisted consent decision.
    #[must_use]
    pub fn permission_file_path(&self) -> PathBuf {
        self.data_dir().join("permission.toml")
    }
}
