//! Session context for one export screen.
//!
//! Owns the permission machine, the loaded contacts and the exporter, and
//! sequences permission -> acquisition -> export. Stages take `&mut self`,
//! so a session runs one load at a time.

use crate::domain::{
    AppError, ContactFields, ContactRecord, ContactStore, ExportFormat, ExportOutcome, FileSink,
    LoadOutcome, PermissionProvider, PermissionState, Result, ShareSink,
};

use super::acquisition::acquire;
use super::exporter::Exporter;
use super::permission::PermissionMachine;

/// Mutable state shared by the pipeline stages of one session.
pub struct ExportSession<P, C, F, S> {
    permission: PermissionMachine<P>,
    store: C,
    fields: ContactFields,
    contacts: Vec<ContactRecord>,
    exporter: Exporter<F, S>,
}

impl<P, C, F, S> ExportSession<P, C, F, S>
where
    P: PermissionProvider,
    C: ContactStore,
    F: FileSink,
    S: ShareSink,
{
    #[must_use]
    pub fn new(provider: P, store: C, exporter: Exporter<F, S>) -> Self {
        Self {
            permission: PermissionMachine::new(provider),
            store,
            fields: ContactFields::default(),
            contacts: Vec::new(),
            exporter,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: ContactFields) -> Self {
        self.fields = fields;
        self
    }

    #[cfg(test)]
    #[must_use]
    pub const fn permission_state(&self) -> PermissionState {
        self.permission.state()
    }

    /// Contacts from the last load, empty if it failed or found none.
    #[must_use]
    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    #[must_use]
    pub const fn exporter(&self) -> &Exporter<F, S> {
        &self.exporter
    }

    /// Probes the current permission status.
    ///
    /// # Errors
    /// Returns `AppError::Probe` if the status cannot be read.
    pub async fn check_permission(&mut self) -> Result<PermissionState> {
        self.permission.query_status().await
    }

    /// Asks the user for contact access.
    ///
    /// # Errors
    /// Returns `AppError::Request` if the prompt cannot be shown.
    pub async fn request_permission(&mut self) -> Result<PermissionState> {
        self.permission.request_grant().await
    }

    /// Re-checks the grant and loads every contact from the store.
    ///
    /// # Errors
    /// Returns `AppError::PermissionRequired` if access is not granted, or
    /// the probe/acquisition error that stopped the load.
    pub async fn load_contacts(&mut self) -> Result<LoadOutcome> {
        self.contacts.clear();

        let status = self.permission.query_status().await?;
        let contacts = acquire(status, &self.store, self.fields).await?;

        if contacts.is_empty() {
            return Ok(LoadOutcome::NoContacts);
        }

        self.contacts = contacts;
        Ok(LoadOutcome::Loaded(self.contacts.len()))
    }

    /// Runs the whole pipeline for `format`.
    ///
    /// Asks for permission when it is undetermined and stops cleanly if it
    /// is not granted. No error escapes: every failure is reported as
    /// `ExportOutcome::Failed`.
    pub async fn export(&mut self, format: ExportFormat) -> ExportOutcome {
        match self.ensure_permission().await {
            Ok(PermissionState::Granted) => {}
            Ok(status) => {
                tracing::info!(status = %status, "Export stopped, permission not granted");
                return ExportOutcome::PermissionNotGranted(status);
            }
            Err(e) => return failed(format, &e),
        }

        match self.load_contacts().await {
            Ok(LoadOutcome::Loaded(_)) => self.exporter.run_export(format, &self.contacts).await,
            Ok(LoadOutcome::NoContacts) => ExportOutcome::NoContacts,
            Err(AppError::PermissionRequired) => {
                ExportOutcome::PermissionNotGranted(self.permission.state())
            }
            Err(e) => failed(format, &e),
        }
    }

    async fn ensure_permission(&mut self) -> Result<PermissionState> {
        match self.permission.query_status().await? {
            PermissionState::Undetermined => self.permission.request_grant().await,
            status => Ok(status),
        }
    }
}

fn failed(format: ExportFormat, err: &AppError) -> ExportOutcome {
    tracing::error!("Error exporting contacts: {}", err);
    ExportOutcome::Failed {
        message: format!("Failed to export contacts to {}: {err}", format.label()),
    }
}
