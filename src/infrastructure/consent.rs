//! File-backed contact permission.
//!
//! The consent decision is stored as TOML next to the configuration. A
//! stored decision, granted or denied, is final until reset.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::domain::{AppError, PermissionProvider, PermissionState, Result};

/// How consent is obtained when no decision is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentPrompt {
    /// Ask on the terminal.
    Interactive,
    /// Use a fixed answer (`Some(true)` for `--yes`, `None` for no answer).
    Fixed(Option<bool>),
}

/// Stored consent decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConsentRecord {
    status: PermissionState,
    decided_at: DateTime<Utc>,
}

/// Permission provider persisting the decision in a consent file.
#[derive(Debug, Clone)]
pub struct ConsentFileProvider {
    path: PathBuf,
    prompt: ConsentPrompt,
}

impl ConsentFileProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, prompt: ConsentPrompt) -> Self {
        Self {
            path: path.into(),
            prompt,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forgets the stored decision.
    ///
    /// # Errors
    /// Returns error if the consent file exists but cannot be removed.
    pub async fn reset(&self) -> Result<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Permission decision cleared");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::io(
                format!("Failed to remove {}", self.path.display()),
                e,
            )),
        }
    }

    async fn read_record(&self) -> Result<Option<ConsentRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Probe {
                    message: format!("{}: {e}", self.path.display()),
                })
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| AppError::Probe {
                message: format!("Invalid consent file {}: {e}", self.path.display()),
            })
    }

    async fn write_record(&self, status: PermissionState) -> Result<()> {
        let record = ConsentRecord {
            status,
            decided_at: Utc::now(),
        };
        let content = toml::to_string_pretty(&record).map_err(|e| AppError::Request {
            message: format!("Failed to serialize consent: {e}"),
        })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Request {
                    message: format!("Failed to create {}: {e}", parent.display()),
                })?;
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::Request {
                message: format!("Failed to record consent: {e}"),
            })
    }

    async fn ask(&self) -> Result<Option<bool>> {
        match self.prompt {
            ConsentPrompt::Fixed(answer) => Ok(answer),
            ConsentPrompt::Interactive => ask_terminal().await,
        }
    }
}

#[async_trait]
impl PermissionProvider for ConsentFileProvider {
    async fn get_status(&self) -> Result<PermissionState> {
        Ok(self
            .read_record()
            .await?
            .map_or(PermissionState::Undetermined, |r| r.status))
    }

    async fn request_status(&self) -> Result<PermissionState> {
        let stored = self.read_record().await.map_err(|e| AppError::Request {
            message: e.to_string(),
        })?;

        match stored.map(|r| r.status) {
            Some(PermissionState::Granted) => return Ok(PermissionState::Granted),
            Some(PermissionState::Denied) => {
                tracing::debug!("Permission previously denied, not prompting");
                return Ok(PermissionState::Denied);
            }
            Some(PermissionState::Undetermined) | None => {}
        }

        let status = match self.ask().await? {
            Some(true) => PermissionState::Granted,
            Some(false) => PermissionState::Denied,
            None => return Ok(PermissionState::Undetermined),
        };

        self.write_record(status).await?;
        tracing::info!(status = %status, path = %self.path.display(), "Permission decision recorded");

        Ok(status)
    }
}

/// Asks a yes/no question on the terminal. Empty input or EOF is no answer.
async fn ask_terminal() -> Result<Option<bool>> {
    if !std::io::stdin().is_terminal() {
        return Err(AppError::Request {
            message: "no terminal available for the consent prompt (use --yes)".into(),
        });
    }

    let request_error = |e: std::io::Error| AppError::Request {
        message: e.to_string(),
    };

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(b"Allow access to your contacts? [y/n] ")
        .await
        .map_err(request_error)?;
    stdout.flush().await.map_err(request_error)?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(request_error)?;

    Ok(parse_answer(&line))
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
