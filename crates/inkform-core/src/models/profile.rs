//! User profile domain model.
//!
//! A profile is the single global record binding an external identity to a
//! role, an optional studio membership, and a status. It replaces the older
//! per-studio membership table with one row per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global user roles.
///
/// `StudioAdmin` can create a studio and administer it; `StudioMember`
/// operates within an assigned studio (templates, forms, archive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    StudioAdmin,
    StudioMember,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::StudioAdmin => "studio_admin",
            UserRole::StudioMember => "studio_member",
        }
    }

    /// Parse a stored role name. Unknown names yield `None` so that
    /// permission lookups on them fail closed.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "studio_admin" => Some(UserRole::StudioAdmin),
            "studio_member" => Some(UserRole::StudioMember),
            _ => None,
        }
    }
}

/// Profile status.
///
/// `Pending` means onboarding is incomplete: the user was invited (or
/// self-registered) but has not set a password / accepted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Active,
    Pending,
    Inactive,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Active => "active",
            ProfileStatus::Pending => "pending",
            ProfileStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProfileStatus::Active),
            "pending" => Some(ProfileStatus::Pending),
            "inactive" => Some(ProfileStatus::Inactive),
            _ => None,
        }
    }
}

/// One profile per authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// External identity reference. Unique, immutable.
    pub user_id: Uuid,
    pub role: UserRole,
    /// Null until the user joins (or creates) a studio.
    pub studio_id: Option<Uuid>,
    pub status: ProfileStatus,
    /// Who sent the invitation, when invited by another user.
    pub invited_by: Option<Uuid>,
    pub invited_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// True iff the profile may create a studio: an active studio admin
    /// that does not belong to one yet.
    pub fn can_create_studio(&self) -> bool {
        self.role == UserRole::StudioAdmin
            && self.studio_id.is_none()
            && self.status == ProfileStatus::Active
    }

    /// True iff the profile is an active member of the given studio.
    pub fn is_active_member_of(&self, studio_id: Uuid) -> bool {
        self.status == ProfileStatus::Active && self.studio_id == Some(studio_id)
    }
}

/// Fields required to create a new profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserProfile {
    pub user_id: Uuid,
    pub role: UserRole,
    pub studio_id: Option<Uuid>,
    pub status: ProfileStatus,
    pub invited_by: Option<Uuid>,
    pub invited_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Partial profile update. Last write wins; there is no optimistic
/// concurrency control on profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserProfile {
    pub role: Option<UserRole>,
    pub studio_id: Option<Uuid>,
    pub status: Option<ProfileStatus>,
    pub accepted_at: Option<DateTime<Utc>>,
}
