//! Per-request authentication context.

use inkform_core::identity::Identity;
use inkform_core::models::profile::{ProfileStatus, UserProfile};
use uuid::Uuid;

/// The authenticated caller, resolved once per request: the provider's
/// identity plus the application profile, when one exists.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub profile: Option<UserProfile>,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.identity.id
    }

    /// The studio the caller is an active member of, if any.
    pub fn active_studio(&self) -> Option<Uuid> {
        self.profile
            .as_ref()
            .filter(|p| p.status == ProfileStatus::Active)
            .and_then(|p| p.studio_id)
    }
}
