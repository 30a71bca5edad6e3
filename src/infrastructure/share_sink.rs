//! Share target that hands the exported file to an external program.
//!
//! The configured command (for example `xdg-open` or `open`) receives the
//! file path as its only argument.

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::{AppError, Location, Result, ShareSink};

/// Share sink running a configured command.
#[derive(Debug, Clone, Default)]
pub struct CommandShareSink {
    command: Option<String>,
}

impl CommandShareSink {
    #[must_use]
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[async_trait]
impl ShareSink for CommandShareSink {
    async fn is_available(&self) -> bool {
        self.command.is_some()
    }

    async fn share(&self, location: &Location, mime_type: &str, dialog_title: &str) -> Result<()> {
        let Some(ref command) = self.command else {
            return Err(AppError::Io {
                message: "No share command configured".into(),
                source: None,
            });
        };

        tracing::info!(command = %command, title = dialog_title, "Sharing {}", location);

        let status = Command::new(command)
            .arg(&location.0)
            .env("CONTACT_EXPORT_MIME_TYPE", mime_type)
            .env("CONTACT_EXPORT_TITLE", dialog_title)
            .status()
            .await
            .map_err(|e| AppError::io(format!("Failed to run {command}"), e))?;

        if status.success() {
            Ok(())
        } else {
            Err(AppError::Io {
                message: format!("Share command {command} exited with {status}"),
                source: None,
            })
        }
    }
}
