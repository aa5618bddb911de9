//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Studio-scoped repositories take a
//! `studio_id` parameter so every query is tenant-filtered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InkformResult;
use crate::models::{
    archived_pdf::{
        ArchivedPdf, ArchivedPdfFilter, CreateArchivedPdf, StorageStats, UpdateArchivedPdf,
    },
    form::{CreateForm, Form, UpdateForm},
    invitation::{CreateStudioInvitation, StudioInvitation},
    profile::{CreateUserProfile, UpdateUserProfile, UserProfile},
    studio::{CreateStudio, Studio, UpdateStudio},
    template::{CreateTemplate, Template, UpdateTemplate},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Profiles (global scope, keyed by external identity)
// ---------------------------------------------------------------------------

pub trait ProfileRepository: Send + Sync {
    /// Insert a profile. Fails if the user already has one.
    fn create(
        &self,
        input: CreateUserProfile,
    ) -> impl Future<Output = InkformResult<UserProfile>> + Send;

    /// Fails soft: `Ok(None)` when the profile does not exist.
    fn get(&self, user_id: Uuid) -> impl Future<Output = InkformResult<Option<UserProfile>>> + Send;

    /// Partial update, last-write-wins.
    fn update(
        &self,
        user_id: Uuid,
        input: UpdateUserProfile,
    ) -> impl Future<Output = InkformResult<UserProfile>> + Send;

    /// Hard delete. Used only by the cleanup job.
    fn delete(&self, user_id: Uuid) -> impl Future<Output = InkformResult<()>> + Send;

    /// Active profiles belonging to a studio.
    fn list_active_by_studio(
        &self,
        studio_id: Uuid,
    ) -> impl Future<Output = InkformResult<Vec<UserProfile>>> + Send;

    /// Pending profiles whose invitation predates the cutoff (cleanup).
    fn list_pending_invited_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<Vec<UserProfile>>> + Send;

    /// Set every profile of a studio to inactive. Returns the number of
    /// profiles touched. Used when a studio is soft-deleted.
    fn deactivate_by_studio(
        &self,
        studio_id: Uuid,
    ) -> impl Future<Output = InkformResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Studios
// ---------------------------------------------------------------------------

pub trait StudioRepository: Send + Sync {
    fn create(&self, input: CreateStudio) -> impl Future<Output = InkformResult<Studio>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = InkformResult<Option<Studio>>> + Send;

    /// Slug lookup among active studios only; soft-deleted studios free
    /// their slug.
    fn get_active_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = InkformResult<Option<Studio>>> + Send;

    /// The active studio owned by an identity, if any.
    fn get_active_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = InkformResult<Option<Studio>>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateStudio,
    ) -> impl Future<Output = InkformResult<Studio>> + Send;

    /// Soft delete: sets `is_active = false`. Cascading member
    /// deactivation is the studio service's job.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = InkformResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

pub trait InvitationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateStudioInvitation,
    ) -> impl Future<Output = InkformResult<StudioInvitation>> + Send;

    fn get_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = InkformResult<Option<StudioInvitation>>> + Send;

    /// The invitation behind a token, only while it is still pending and
    /// unexpired at `now`. Expired and consumed tokens are
    /// indistinguishable (`Ok(None)`).
    fn get_pending_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<Option<StudioInvitation>>> + Send;

    /// Pending, unexpired invitation for a (studio, email) pair, if any.
    fn find_pending(
        &self,
        studio_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<Option<StudioInvitation>>> + Send;

    /// All invitations of a studio, newest first.
    fn list_by_studio(
        &self,
        studio_id: Uuid,
    ) -> impl Future<Output = InkformResult<Vec<StudioInvitation>>> + Send;

    /// Pending, unexpired invitations addressed to an email, newest first.
    fn list_pending_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<Vec<StudioInvitation>>> + Send;

    fn mark_accepted(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<()>> + Send;

    fn mark_declined(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<()>> + Send;

    /// Compensation path: put an invitation back to pending after a failed
    /// acceptance, clearing `accepted_at`.
    fn revert_to_pending(&self, id: Uuid) -> impl Future<Output = InkformResult<()>> + Send;

    /// Resend: fresh token and expiry, status reset to pending even if it
    /// had drifted to expired.
    fn refresh(
        &self,
        id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<StudioInvitation>> + Send;

    /// Persist `expired` on every pending invitation addressed to an
    /// email. Returns the number touched. Used by the cleanup job.
    fn mark_expired_by_email(&self, email: &str)
    -> impl Future<Output = InkformResult<u64>> + Send;

    /// Hard delete (cancellation of a pending invitation).
    fn delete(&self, id: Uuid) -> impl Future<Output = InkformResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Templates (studio-scoped)
// ---------------------------------------------------------------------------

pub trait TemplateRepository: Send + Sync {
    fn create(&self, input: CreateTemplate) -> impl Future<Output = InkformResult<Template>> + Send;

    fn get_by_id(
        &self,
        studio_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = InkformResult<Option<Template>>> + Send;

    /// Active templates of a studio, newest first.
    fn list_active(
        &self,
        studio_id: Uuid,
    ) -> impl Future<Output = InkformResult<Vec<Template>>> + Send;

    fn update(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: UpdateTemplate,
    ) -> impl Future<Output = InkformResult<Template>> + Send;

    /// Soft delete: sets `is_active = false`.
    fn soft_delete(
        &self,
        studio_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = InkformResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Forms (studio-scoped)
// ---------------------------------------------------------------------------

pub trait FormRepository: Send + Sync {
    fn create(&self, input: CreateForm) -> impl Future<Output = InkformResult<Form>> + Send;

    fn get_by_id(
        &self,
        studio_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = InkformResult<Option<Form>>> + Send;

    /// Forms of a studio, newest first.
    fn list_by_studio(
        &self,
        studio_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = InkformResult<PaginatedResult<Form>>> + Send;

    fn update(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: UpdateForm,
    ) -> impl Future<Output = InkformResult<Form>> + Send;

    fn delete(&self, studio_id: Uuid, id: Uuid) -> impl Future<Output = InkformResult<()>> + Send;

    /// Case-insensitive substring search on the client name.
    fn search_by_client_name(
        &self,
        studio_id: Uuid,
        client_name: &str,
    ) -> impl Future<Output = InkformResult<Vec<Form>>> + Send;

    fn list_by_date_range(
        &self,
        studio_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = InkformResult<Vec<Form>>> + Send;
}

// ---------------------------------------------------------------------------
// Archived PDFs (studio-scoped)
// ---------------------------------------------------------------------------

pub trait ArchivedPdfRepository: Send + Sync {
    fn create(
        &self,
        input: CreateArchivedPdf,
    ) -> impl Future<Output = InkformResult<ArchivedPdf>> + Send;

    fn get_by_id(
        &self,
        studio_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = InkformResult<Option<ArchivedPdf>>> + Send;

    fn get_by_form(
        &self,
        studio_id: Uuid,
        form_id: Uuid,
    ) -> impl Future<Output = InkformResult<Option<ArchivedPdf>>> + Send;

    fn search(
        &self,
        studio_id: Uuid,
        filter: ArchivedPdfFilter,
        pagination: Pagination,
    ) -> impl Future<Output = InkformResult<PaginatedResult<ArchivedPdf>>> + Send;

    fn update(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: UpdateArchivedPdf,
    ) -> impl Future<Output = InkformResult<ArchivedPdf>> + Send;

    fn delete(&self, studio_id: Uuid, id: Uuid) -> impl Future<Output = InkformResult<()>> + Send;

    /// Document count and total bytes stored for a studio.
    fn storage_stats(
        &self,
        studio_id: Uuid,
    ) -> impl Future<Output = InkformResult<StorageStats>> + Send;
}
