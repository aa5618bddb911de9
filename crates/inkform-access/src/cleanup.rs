//! Cleanup of abandoned invitations.
//!
//! Sending an invitation provisions a pending identity and a pending
//! profile. When the invitation is never answered, those leftovers are
//! reaped here: the email's pending invitations get the persisted
//! `expired` status, then the profile and the identity are deleted.

use chrono::{Duration, Utc};
use inkform_core::error::InkformResult;
use inkform_core::identity::IdentityProvider;
use inkform_core::repository::{InvitationRepository, ProfileRepository};
use tracing::{info, warn};

use crate::config::InvitationConfig;

/// What a cleanup run did.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub expired_invitations: u64,
    pub deleted_profiles: u64,
    pub deleted_identities: u64,
    /// Per-user failures. The run continues past them.
    pub errors: Vec<String>,
}

/// Cleanup service for abandoned invitations.
pub struct CleanupService<P, I, D>
where
    P: ProfileRepository,
    I: InvitationRepository,
    D: IdentityProvider,
{
    profiles: P,
    invitations: I,
    directory: D,
    config: InvitationConfig,
}

impl<P, I, D> CleanupService<P, I, D>
where
    P: ProfileRepository,
    I: InvitationRepository,
    D: IdentityProvider,
{
    pub fn new(profiles: P, invitations: I, directory: D) -> Self {
        Self::with_config(profiles, invitations, directory, Default::default())
    }

    pub fn with_config(
        profiles: P,
        invitations: I,
        directory: D,
        config: InvitationConfig,
    ) -> Self {
        Self {
            profiles,
            invitations,
            directory,
            config,
        }
    }

    /// Reap every pending profile whose invitation is older than the
    /// configured threshold. Failures for one user do not stop the run.
    pub async fn cleanup(&self) -> InkformResult<CleanupReport> {
        let cutoff = Utc::now() - Duration::days(self.config.cleanup_threshold_days);
        let stale = self.profiles.list_pending_invited_before(cutoff).await?;

        let mut report = CleanupReport::default();
        for profile in stale {
            if let Err(e) = self.reap(profile.user_id, &mut report).await {
                warn!(user_id = %profile.user_id, error = %e, "cleanup failed for user");
                report.errors.push(format!("{}: {e}", profile.user_id));
            }
        }

        info!(
            expired = report.expired_invitations,
            profiles = report.deleted_profiles,
            identities = report.deleted_identities,
            failures = report.errors.len(),
            "cleanup run finished"
        );
        Ok(report)
    }

    async fn reap(&self, user_id: uuid::Uuid, report: &mut CleanupReport) -> InkformResult<()> {
        if let Some(identity) = self.directory.get_by_id(user_id).await? {
            report.expired_invitations += self
                .invitations
                .mark_expired_by_email(&identity.email)
                .await?;
        }

        self.profiles.delete(user_id).await?;
        report.deleted_profiles += 1;

        self.directory.delete(user_id).await?;
        report.deleted_identities += 1;

        Ok(())
    }
}
