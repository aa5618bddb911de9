//! Studio invitation domain model.
//!
//! An invitation is a time-boxed, single-use token granting a specific
//! email the right to join a specific studio with a specific role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::UserRole;

/// Invitation status.
///
/// `Expired` is normally a derived state (computed from `expires_at` at
/// read time); only the cleanup job persists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvitationStatus::Pending),
            "accepted" => Some(InvitationStatus::Accepted),
            "declined" => Some(InvitationStatus::Declined),
            "expired" => Some(InvitationStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioInvitation {
    pub id: Uuid,
    pub studio_id: Uuid,
    pub invited_email: String,
    /// User that sent the invitation.
    pub invited_by: Uuid,
    pub role: UserRole,
    pub status: InvitationStatus,
    /// Unguessable, single-use token. Consuming it (accept/decline)
    /// transitions the status away from `Pending`, after which the token
    /// is inert even if presented again.
    pub token: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl StudioInvitation {
    /// Expiry is a time comparison, not a stored transition.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn can_respond(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }
}

/// Fields required to insert a new invitation. The token and expiry are
/// computed by the invitation service, not the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudioInvitation {
    pub studio_id: Uuid,
    pub invited_email: String,
    pub invited_by: Uuid,
    pub role: UserRole,
    pub token: String,
    pub message: Option<String>,
    pub expires_at: DateTime<Utc>,
}
