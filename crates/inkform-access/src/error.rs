//! Access error types.

use inkform_core::error::InkformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("user profile not found")]
    ProfileNotFound,

    #[error("only studio administrators without a studio can create one")]
    CannotCreateStudio,

    #[error("studio name produces an empty slug")]
    EmptySlug,

    #[error("studio slug '{0}' is already in use")]
    SlugTaken(String),

    #[error("studio not found")]
    StudioNotFound,

    #[error("only the studio owner can do this")]
    NotOwner,

    #[error("only the studio owner or an administrator can do this")]
    NotAdmin,

    #[error("user is already a member of a studio")]
    AlreadyMember,

    #[error("user already owns a studio")]
    AlreadyOwner,

    #[error("a pending invitation for this email already exists")]
    InvitationPending,

    #[error("invitation not found or expired")]
    InvitationNotFoundOrExpired,

    #[error("invitation was addressed to a different email")]
    EmailMismatch,

    // Carries the underlying failure for the logs; callers see only the
    // generic message.
    #[error("could not complete the operation")]
    Dependency(String),
}

impl From<AccessError> for InkformError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::CannotCreateStudio
            | AccessError::NotOwner
            | AccessError::NotAdmin
            | AccessError::EmailMismatch => InkformError::AuthorizationDenied {
                reason: err.to_string(),
            },
            AccessError::SlugTaken(_)
            | AccessError::AlreadyMember
            | AccessError::AlreadyOwner
            | AccessError::InvitationPending => InkformError::Conflict {
                message: err.to_string(),
            },
            AccessError::EmptySlug => InkformError::Validation {
                message: err.to_string(),
            },
            AccessError::ProfileNotFound => InkformError::NotFound {
                entity: "user_profile".into(),
                id: String::new(),
            },
            AccessError::StudioNotFound => InkformError::NotFound {
                entity: "studio".into(),
                id: String::new(),
            },
            AccessError::InvitationNotFoundOrExpired => InkformError::NotFound {
                entity: "studio_invitation".into(),
                id: String::new(),
            },
            AccessError::Dependency(detail) => InkformError::Internal(detail),
        }
    }
}
