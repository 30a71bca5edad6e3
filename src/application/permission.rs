//! Permission state machine gating contact access.
//!
//! Starts `Undetermined` and moves to `Granted` or `Denied` as the
//! provider reports. Probe and request failures are returned as errors and
//! never recorded as a state.

use crate::domain::{PermissionProvider, PermissionState, Result};

/// Tracks the session's view of the contact-store grant.
pub struct PermissionMachine<P> {
    provider: P,
    state: PermissionState,
}

impl<P: PermissionProvider> PermissionMachine<P> {
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            state: PermissionState::Undetermined,
        }
    }

    /// Last observed status.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        self.state
    }

    /// Probes the live status and records it.
    ///
    /// # Errors
    /// Returns `AppError::Probe` if the check fails; the recorded state is
    /// left unchanged.
    pub async fn query_status(&mut self) -> Result<PermissionState> {
        let status = self.provider.get_status().await?;
        self.observe(status);
        Ok(status)
    }

    /// Prompts for consent unless access is already granted.
    ///
    /// # Errors
    /// Returns `AppError::Request` if the prompt cannot be shown.
    pub async fn request_grant(&mut self) -> Result<PermissionState> {
        if self.state.is_granted() {
            tracing::debug!("Permission already granted, skipping prompt");
            return Ok(PermissionState::Granted);
        }

        let status = self.provider.request_status().await?;
        self.observe(status);
        Ok(status)
    }

    fn observe(&mut self, status: PermissionState) {
        if status != self.state {
            tracing::info!(from = %self.state, to = %status, "Permission state changed");
        }
        self.state = status;
    }
}
