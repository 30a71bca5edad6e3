//! Export file persistence in a local directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{AppError, FileSink, Location, Result};

/// Writes export files into one output directory.
#[derive(Debug, Clone)]
pub struct DirectoryFileSink {
    dir: PathBuf,
    create_dir: bool,
}

impl DirectoryFileSink {
    /// `create_dir` controls whether a missing directory is created or
    /// treated as refused storage access.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, create_dir: bool) -> Self {
        Self {
            dir: dir.into(),
            create_dir,
        }
    }

    async fn ensure_dir(&self) -> Result<()> {
        if tokio::fs::metadata(&self.dir).await.is_ok_and(|m| m.is_dir()) {
            return Ok(());
        }

        if !self.create_dir {
            return Err(AppError::DirectoryPermission {
                path: self.dir.clone(),
            });
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => AppError::DirectoryPermission {
                    path: self.dir.clone(),
                },
                _ => AppError::write(&self.dir, e),
            })
    }
}

#[async_trait]
impl FileSink for DirectoryFileSink {
    async fn write(&self, filename: &str, content: &str, mime_type: &str) -> Result<Location> {
        self.ensure_dir().await?;

        let path = self.dir.join(filename);
        tracing::debug!(path = %path.display(), mime_type, "Writing export file");

        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => AppError::DirectoryPermission {
                    path: self.dir.clone(),
                },
                _ => AppError::write(&path, e),
            })?;

        Ok(Location(path))
    }
}
