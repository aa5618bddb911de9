//! External identity provider traits.
//!
//! Session issuance, password hashing, and token signing live outside this
//! system. The core only consumes two capabilities: resolving the identity
//! behind a session, and administering identities (provisioning a pending
//! identity for an invited email, deleting abandoned ones).
//!
//! These traits are object-safe so the server can hold them behind `dyn`;
//! repository traits stay RPITIT-based instead.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::InkformResult;

/// An authenticated identity as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Administrative access to the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> InkformResult<Option<Identity>>;

    async fn get_by_email(&self, email: &str) -> InkformResult<Option<Identity>>;

    /// Provision a pending identity for an invited email. The provider is
    /// responsible for delivering the invitation email out of band.
    async fn invite(&self, email: &str) -> InkformResult<Identity>;

    /// Hard-delete an identity (cleanup of abandoned invitations).
    async fn delete(&self, id: Uuid) -> InkformResult<()>;
}

/// Resolves an opaque session token to the identity it belongs to.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `Ok(None)` for unknown or expired sessions.
    async fn resolve(&self, session_token: &str) -> InkformResult<Option<Identity>>;
}
