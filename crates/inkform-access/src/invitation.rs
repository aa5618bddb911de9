//! Invitation lifecycle orchestration.
//!
//! `pending → {accepted, declined, expired}`. Expiry is derived at read
//! time from `expires_at`; the stored status only moves to `expired` when
//! the cleanup job runs. A consumed or expired token is reported as
//! "not found or expired" without distinguishing the two.

use chrono::{Duration, Utc};
use inkform_core::error::InkformResult;
use inkform_core::identity::{Identity, IdentityProvider};
use inkform_core::models::invitation::{
    CreateStudioInvitation, InvitationStatus, StudioInvitation,
};
use inkform_core::models::profile::{
    CreateUserProfile, ProfileStatus, UpdateUserProfile, UserRole,
};
use inkform_core::repository::{InvitationRepository, ProfileRepository, StudioRepository};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::InvitationConfig;
use crate::error::AccessError;
use crate::token::generate_invitation_token;

/// Invitation service.
///
/// Generic over the repository traits and the identity provider so that
/// this layer has no dependency on the database crate.
pub struct InvitationService<S, P, I, D>
where
    S: StudioRepository,
    P: ProfileRepository,
    I: InvitationRepository,
    D: IdentityProvider,
{
    studios: S,
    profiles: P,
    invitations: I,
    directory: D,
    config: InvitationConfig,
}

impl<S, P, I, D> InvitationService<S, P, I, D>
where
    S: StudioRepository,
    P: ProfileRepository,
    I: InvitationRepository,
    D: IdentityProvider,
{
    pub fn new(studios: S, profiles: P, invitations: I, directory: D) -> Self {
        Self::with_config(studios, profiles, invitations, directory, Default::default())
    }

    pub fn with_config(
        studios: S,
        profiles: P,
        invitations: I,
        directory: D,
        config: InvitationConfig,
    ) -> Self {
        Self {
            studios,
            profiles,
            invitations,
            directory,
            config,
        }
    }

    /// Invite an email to join a studio.
    ///
    /// The invitee gets a pending identity and a pending profile bound to
    /// the studio right away, so the cleanup job can reap abandoned
    /// invitations together with their provisioned accounts.
    pub async fn send(
        &self,
        actor: Uuid,
        studio_id: Uuid,
        email: &str,
        role: UserRole,
        message: Option<String>,
    ) -> InkformResult<StudioInvitation> {
        self.require_manager(studio_id, actor).await?;

        // The invitee must not already be an active member somewhere.
        let existing_identity = self.directory.get_by_email(email).await?;
        if let Some(identity) = &existing_identity {
            if let Some(profile) = self.profiles.get(identity.id).await? {
                if profile.status == ProfileStatus::Active && profile.studio_id.is_some() {
                    return Err(AccessError::AlreadyMember.into());
                }
            }
        }

        let now = Utc::now();
        if self
            .invitations
            .find_pending(studio_id, email, now)
            .await?
            .is_some()
        {
            return Err(AccessError::InvitationPending.into());
        }

        let invitation = self
            .invitations
            .create(CreateStudioInvitation {
                studio_id,
                invited_email: email.to_string(),
                invited_by: actor,
                role,
                token: generate_invitation_token(),
                message,
                expires_at: now + Duration::days(self.config.ttl_days),
            })
            .await?;

        // Provision the invitee: pending identity, pending profile.
        let identity = match existing_identity {
            Some(identity) => identity,
            None => self.directory.invite(email).await?,
        };
        if self.profiles.get(identity.id).await?.is_none() {
            self.profiles
                .create(CreateUserProfile {
                    user_id: identity.id,
                    role,
                    studio_id: Some(studio_id),
                    status: ProfileStatus::Pending,
                    invited_by: Some(actor),
                    invited_at: Some(now),
                    accepted_at: None,
                })
                .await?;
        }

        info!(invitation_id = %invitation.id, studio_id = %studio_id, "invitation sent");
        Ok(invitation)
    }

    /// Look up an invitation by its token. Only pending, unexpired
    /// invitations are visible.
    pub async fn get_by_token(&self, token: &str) -> InkformResult<StudioInvitation> {
        self.invitations
            .get_pending_by_token(token, Utc::now())
            .await?
            .ok_or_else(|| AccessError::InvitationNotFoundOrExpired.into())
    }

    /// Accept an invitation as the authenticated `actor`.
    ///
    /// Two dependent writes: the invitation is marked accepted, then the
    /// membership profile is activated. Not a transaction; when the second
    /// write fails the invitation is put back to pending on a best-effort
    /// basis and a dependency error surfaces.
    pub async fn accept(&self, token: &str, actor: &Identity) -> InkformResult<StudioInvitation> {
        let now = Utc::now();
        let invitation = self
            .invitations
            .get_pending_by_token(token, now)
            .await?
            .ok_or(AccessError::InvitationNotFoundOrExpired)?;

        // Exact, case-sensitive match with the invited address.
        if invitation.invited_email != actor.email {
            return Err(AccessError::EmailMismatch.into());
        }

        // The actor must not already own or belong to a studio.
        if self.studios.get_active_by_owner(actor.id).await?.is_some() {
            return Err(AccessError::AlreadyOwner.into());
        }
        let profile = self.profiles.get(actor.id).await?;
        if let Some(p) = &profile {
            if p.status == ProfileStatus::Active && p.studio_id.is_some() {
                return Err(AccessError::AlreadyMember.into());
            }
        }

        self.invitations.mark_accepted(invitation.id, now).await?;

        let membership = UpdateUserProfile {
            role: Some(invitation.role),
            studio_id: Some(invitation.studio_id),
            status: Some(ProfileStatus::Active),
            accepted_at: Some(now),
        };
        let second_write = match profile {
            Some(_) => self.profiles.update(actor.id, membership).await.map(|_| ()),
            None => self
                .profiles
                .create(CreateUserProfile {
                    user_id: actor.id,
                    role: invitation.role,
                    studio_id: Some(invitation.studio_id),
                    status: ProfileStatus::Active,
                    invited_by: Some(invitation.invited_by),
                    invited_at: Some(invitation.created_at),
                    accepted_at: Some(now),
                })
                .await
                .map(|_| ()),
        };

        if let Err(e) = second_write {
            warn!(invitation_id = %invitation.id, error = %e, "membership activation failed, reverting invitation");
            if let Err(revert) = self.invitations.revert_to_pending(invitation.id).await {
                error!(invitation_id = %invitation.id, error = %revert, "compensation failed, invitation left accepted");
            }
            return Err(AccessError::Dependency(e.to_string()).into());
        }

        info!(invitation_id = %invitation.id, studio_id = %invitation.studio_id, "invitation accepted");
        self.invitations
            .get_by_id(invitation.id)
            .await?
            .ok_or_else(|| AccessError::InvitationNotFoundOrExpired.into())
    }

    /// Decline an invitation. Single write; same freshness and email rules
    /// as acceptance.
    pub async fn decline(&self, token: &str, actor: &Identity) -> InkformResult<()> {
        let now = Utc::now();
        let invitation = self
            .invitations
            .get_pending_by_token(token, now)
            .await?
            .ok_or(AccessError::InvitationNotFoundOrExpired)?;

        if invitation.invited_email != actor.email {
            return Err(AccessError::EmailMismatch.into());
        }

        self.invitations.mark_declined(invitation.id, now).await?;
        info!(invitation_id = %invitation.id, "invitation declined");
        Ok(())
    }

    /// Cancel a still-pending invitation. Allowed for the studio owner, an
    /// active studio administrator, or the original sender. Hard delete.
    pub async fn cancel(&self, invitation_id: Uuid, actor: Uuid) -> InkformResult<()> {
        let invitation = self.get_managed(invitation_id, actor).await?;
        if invitation.status != InvitationStatus::Pending {
            return Err(AccessError::InvitationNotFoundOrExpired.into());
        }
        self.invitations.delete(invitation.id).await?;
        info!(invitation_id = %invitation.id, "invitation cancelled");
        Ok(())
    }

    /// Resend an invitation: fresh token and expiry, status back to
    /// pending even when it had drifted to expired. Same authorization as
    /// cancellation.
    pub async fn resend(&self, invitation_id: Uuid, actor: Uuid) -> InkformResult<StudioInvitation> {
        let invitation = self.get_managed(invitation_id, actor).await?;
        let refreshed = self
            .invitations
            .refresh(
                invitation.id,
                generate_invitation_token(),
                Utc::now() + Duration::days(self.config.ttl_days),
            )
            .await?;
        info!(invitation_id = %refreshed.id, "invitation resent");
        Ok(refreshed)
    }

    /// All invitations of a studio, any status. Owner or administrator
    /// only.
    pub async fn list_for_studio(
        &self,
        studio_id: Uuid,
        actor: Uuid,
    ) -> InkformResult<Vec<StudioInvitation>> {
        self.require_manager(studio_id, actor).await?;
        self.invitations.list_by_studio(studio_id).await
    }

    /// Pending, unexpired invitations addressed to an email.
    pub async fn list_pending_for_email(
        &self,
        email: &str,
    ) -> InkformResult<Vec<StudioInvitation>> {
        self.invitations
            .list_pending_by_email(email, Utc::now())
            .await
    }

    /// Owner or active administrator of the studio.
    async fn require_manager(&self, studio_id: Uuid, actor: Uuid) -> InkformResult<()> {
        let studio = self
            .studios
            .get_by_id(studio_id)
            .await?
            .ok_or(AccessError::StudioNotFound)?;
        if studio.owner_id == actor {
            return Ok(());
        }

        let profile = self.profiles.get(actor).await?;
        let is_admin = profile.is_some_and(|p| {
            p.status == ProfileStatus::Active
                && p.studio_id == Some(studio_id)
                && p.role == UserRole::StudioAdmin
        });
        if is_admin {
            Ok(())
        } else {
            Err(AccessError::NotAdmin.into())
        }
    }

    /// Fetch a pending invitation that `actor` may manage: studio owner,
    /// active administrator, or original sender.
    async fn get_managed(
        &self,
        invitation_id: Uuid,
        actor: Uuid,
    ) -> InkformResult<StudioInvitation> {
        let invitation = self
            .invitations
            .get_by_id(invitation_id)
            .await?
            .ok_or(AccessError::InvitationNotFoundOrExpired)?;

        if invitation.invited_by != actor {
            self.require_manager(invitation.studio_id, actor).await?;
        }
        Ok(invitation)
    }
}
