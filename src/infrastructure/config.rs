//! Configuration file management.
//!
//! Handles loading TOML configuration files and writing the default one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Contact Export Configuration
# Auto-generated - edit as needed

[contacts]
# Address-book database (defaults to ~/.contact-export/contacts.db)
# database = "/path/to/contacts.db"

# Whether to read the company field
include_company = true

[export]
# Where export files are written (defaults to ~/.contact-export/exports)
# output_dir = "/path/to/exports"

# Format used when --format is not given: csv or vcf
default_format = "csv"

# Create the output directory if it is missing
create_output_dir = true

# Program that receives the exported file, e.g. "xdg-open" or "open".
# Without it the file location is reported instead.
# share_command = "xdg-open"

[paths]
# Custom data directory (optional, defaults to ~/.contact-export)
# data_dir = "/custom/path"
"#;

/// Load configuration from the default location or fall back to defaults.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!("No config at {}, using defaults", config_path.display());
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create default configuration file if it doesn't exist.
///
/// Returns whether the file was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Get the path to the default configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default_data_dir().join("config.toml")
}
