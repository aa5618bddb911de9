//! HTTP handlers.
//!
//! Each handler resolves the caller once, checks the operation against the
//! role permission table, calls into the domain services, and answers with
//! `{success, error}` JSON. Internal failures are logged in full and
//! reported with a generic message.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use inkform_access::{AuthContext, NewStudio, generate_slug};
use inkform_core::error::InkformError;
use inkform_core::identity::Identity;
use inkform_core::models::archived_pdf::{
    ArchivedPdf, ArchivedPdfFilter, CreateArchivedPdf, StorageStats, UpdateArchivedPdf,
};
use inkform_core::models::form::{CreateForm, Form, FormStatus, UpdateForm};
use inkform_core::models::invitation::StudioInvitation;
use inkform_core::models::profile::{UserProfile, UserRole};
use inkform_core::models::studio::{Studio, UpdateStudio};
use inkform_core::models::template::{CreateTemplate, Template, UpdateTemplate};
use inkform_core::permissions::{Operation, allows};
use inkform_core::repository::{
    ArchivedPdfRepository, FormRepository, PaginatedResult, Pagination, ProfileRepository,
    TemplateRepository,
};

use crate::middleware::Caller;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response envelope and error mapping
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        error: None,
        data: Some(data),
    })
}

fn ok_empty() -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        error: None,
        data: None,
    })
}

pub struct ApiError(InkformError);

impl From<InkformError> for ApiError {
    fn from(e: InkformError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            InkformError::NotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),
            InkformError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, self.0.to_string())
            }
            InkformError::AuthorizationDenied { .. } => {
                (StatusCode::FORBIDDEN, self.0.to_string())
            }
            InkformError::Validation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string())
            }
            InkformError::Conflict { .. } | InkformError::AlreadyExists { .. } => {
                (StatusCode::CONFLICT, self.0.to_string())
            }
            InkformError::Database(_)
            | InkformError::IdentityProvider(_)
            | InkformError::Internal(_) => {
                error!(error = %self.0, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "could not complete the operation".to_owned(),
                )
            }
        };

        let body = Json(ApiResponse::<()> {
            success: false,
            error: Some(message),
            data: None,
        });
        (status, body).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ---------------------------------------------------------------------------
// Caller resolution
// ---------------------------------------------------------------------------

fn require_identity(caller: &Caller) -> Result<&Identity, ApiError> {
    caller
        .0
        .as_ref()
        .ok_or(ApiError(InkformError::AuthenticationRequired))
}

fn denied(reason: &str) -> ApiError {
    ApiError(InkformError::AuthorizationDenied {
        reason: reason.to_owned(),
    })
}

/// Resolves the caller's studio and checks `op` against their role there.
/// The owner is reported as an administrator by the studio service, so the
/// implicit owner permissions fall out of the same table lookup.
async fn studio_scope(
    state: &AppState,
    caller: &Caller,
    op: Operation,
) -> Result<(Identity, Uuid), ApiError> {
    let identity = require_identity(caller)?.clone();
    let profile = state.profiles.get(identity.id).await?;
    let ctx = AuthContext { identity, profile };

    let studio_id = ctx
        .active_studio()
        .ok_or_else(|| denied("no active studio membership"))?;
    let role = state
        .studios
        .studio_role(studio_id, ctx.user_id())
        .await?
        .ok_or_else(|| denied("not a member of this studio"))?;
    if !allows(role, op) {
        return Err(denied("operation not permitted for this role"));
    }

    Ok((ctx.identity, studio_id))
}

fn not_found(entity: &str, id: Uuid) -> ApiError {
    ApiError(InkformError::NotFound {
        entity: entity.to_owned(),
        id: id.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Studio
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateStudioRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_province: Option<String>,
    pub address_postal_code: Option<String>,
    pub address_country: Option<String>,
    pub partita_iva: Option<String>,
    pub codice_fiscale: Option<String>,
    pub business_name: Option<String>,
    pub settings: Option<serde_json::Value>,
}

impl From<CreateStudioRequest> for NewStudio {
    fn from(r: CreateStudioRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            phone: r.phone,
            website: r.website,
            address_street: r.address_street,
            address_city: r.address_city,
            address_province: r.address_province,
            address_postal_code: r.address_postal_code,
            address_country: r.address_country,
            partita_iva: r.partita_iva,
            codice_fiscale: r.codice_fiscale,
            business_name: r.business_name,
            settings: r.settings,
        }
    }
}

pub async fn create_studio(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<CreateStudioRequest>,
) -> ApiResult<Studio> {
    let identity = require_identity(&caller)?;
    let studio = state
        .studios
        .create_studio(identity.id, body.into())
        .await?;
    Ok(ok(studio))
}

pub async fn current_studio(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Studio> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewStudio).await?;
    let studio = state
        .studios
        .get_studio(studio_id)
        .await?
        .ok_or_else(|| not_found("studio", studio_id))?;
    Ok(ok(studio))
}

pub async fn update_studio(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<UpdateStudio>,
) -> ApiResult<Studio> {
    let (identity, studio_id) = studio_scope(&state, &caller, Operation::EditStudio).await?;
    let studio = state
        .studios
        .update_studio(identity.id, studio_id, body)
        .await?;
    Ok(ok(studio))
}

pub async fn delete_studio(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<()> {
    let (identity, studio_id) = studio_scope(&state, &caller, Operation::DeleteStudio).await?;
    state.studios.delete_studio(identity.id, studio_id).await?;
    Ok(ok_empty())
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<UserProfile>> {
    let (identity, studio_id) = studio_scope(&state, &caller, Operation::ViewMembers).await?;
    let members = state.studios.list_members(identity.id, studio_id).await?;
    Ok(ok(members))
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct InviteRequest {
    pub email: String,
    pub role: UserRole,
    pub message: Option<String>,
}

pub async fn send_invitation(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<InviteRequest>,
) -> ApiResult<StudioInvitation> {
    let (identity, studio_id) =
        studio_scope(&state, &caller, Operation::ManageInvitations).await?;
    let invitation = state
        .invitations
        .send(identity.id, studio_id, &body.email, body.role, body.message)
        .await?;
    Ok(ok(invitation))
}

pub async fn list_studio_invitations(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<StudioInvitation>> {
    let (identity, studio_id) =
        studio_scope(&state, &caller, Operation::ManageInvitations).await?;
    let invitations = state
        .invitations
        .list_for_studio(studio_id, identity.id)
        .await?;
    Ok(ok(invitations))
}

pub async fn cancel_invitation(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let identity = require_identity(&caller)?;
    state.invitations.cancel(id, identity.id).await?;
    Ok(ok_empty())
}

pub async fn resend_invitation(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<StudioInvitation> {
    let identity = require_identity(&caller)?;
    let invitation = state.invitations.resend(id, identity.id).await?;
    Ok(ok(invitation))
}

/// Invitation lookup by token, shown on the accept page. Reachable without
/// a session.
pub async fn get_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> ApiResult<StudioInvitation> {
    let invitation = state.invitations.get_by_token(&token).await?;
    Ok(ok(invitation))
}

pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(token): Path<String>,
) -> ApiResult<StudioInvitation> {
    let identity = require_identity(&caller)?;
    let invitation = state.invitations.accept(&token, identity).await?;
    Ok(ok(invitation))
}

pub async fn decline_invitation(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(token): Path<String>,
) -> ApiResult<()> {
    let identity = require_identity(&caller)?;
    state.invitations.decline(&token, identity).await?;
    Ok(ok_empty())
}

/// Pending invitations addressed to the caller's own email.
pub async fn my_invitations(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<StudioInvitation>> {
    let identity = require_identity(&caller)?;
    let invitations = state
        .invitations
        .list_pending_for_email(&identity.email)
        .await?;
    Ok(ok(invitations))
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
    pub is_default: Option<bool>,
}

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<CreateTemplateRequest>,
) -> ApiResult<Template> {
    let (identity, studio_id) = studio_scope(&state, &caller, Operation::ManageTemplates).await?;

    let slug = generate_slug(&body.name);
    if slug.is_empty() {
        return Err(ApiError(InkformError::Validation {
            message: "template name yields an empty slug".to_owned(),
        }));
    }

    let template = state
        .templates
        .create(CreateTemplate {
            studio_id,
            name: body.name,
            slug,
            description: body.description,
            schema: body.schema,
            is_default: body.is_default.unwrap_or(false),
            created_by: Some(identity.id),
        })
        .await?;
    Ok(ok(template))
}

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<Template>> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewTemplates).await?;
    let templates = state.templates.list_active(studio_id).await?;
    Ok(ok(templates))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Template> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewTemplates).await?;
    let template = state
        .templates
        .get_by_id(studio_id, id)
        .await?
        .ok_or_else(|| not_found("template", id))?;
    Ok(ok(template))
}

pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTemplate>,
) -> ApiResult<Template> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ManageTemplates).await?;
    let template = state.templates.update(studio_id, id, body).await?;
    Ok(ok(template))
}

pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ManageTemplates).await?;
    state.templates.soft_delete(studio_id, id).await?;
    Ok(ok_empty())
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateFormRequest {
    pub template_id: Uuid,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_fiscal_code: Option<String>,
    pub form_data: Option<serde_json::Value>,
    pub signatures: Option<serde_json::Value>,
    pub status: Option<FormStatus>,
    pub form_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            offset: self.offset.unwrap_or(defaults.offset),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

pub async fn create_form(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<CreateFormRequest>,
) -> ApiResult<Form> {
    let (identity, studio_id) = studio_scope(&state, &caller, Operation::ManageForms).await?;
    let form = state
        .forms
        .create(CreateForm {
            studio_id,
            template_id: body.template_id,
            client_name: body.client_name,
            client_email: body.client_email,
            client_phone: body.client_phone,
            client_fiscal_code: body.client_fiscal_code,
            form_data: body.form_data,
            signatures: body.signatures,
            status: body.status,
            form_number: body.form_number,
            notes: body.notes,
            created_by: Some(identity.id),
        })
        .await?;
    Ok(ok(form))
}

pub async fn list_forms(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PaginatedResult<Form>> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewForms).await?;
    let forms = state
        .forms
        .list_by_studio(studio_id, page.pagination())
        .await?;
    Ok(ok(forms))
}

#[derive(Deserialize)]
pub struct FormSearchQuery {
    pub client: String,
}

pub async fn search_forms(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<FormSearchQuery>,
) -> ApiResult<Vec<Form>> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewForms).await?;
    let forms = state
        .forms
        .search_by_client_name(studio_id, &query.client)
        .await?;
    Ok(ok(forms))
}

#[derive(Deserialize)]
pub struct DateRangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub async fn forms_in_range(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Vec<Form>> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewForms).await?;
    let forms = state
        .forms
        .list_by_date_range(studio_id, range.from, range.to)
        .await?;
    Ok(ok(forms))
}

pub async fn get_form(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Form> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewForms).await?;
    let form = state
        .forms
        .get_by_id(studio_id, id)
        .await?
        .ok_or_else(|| not_found("consent_form", id))?;
    Ok(ok(form))
}

#[derive(Serialize)]
pub struct FormWithTemplate {
    pub form: Form,
    pub template: Option<Template>,
}

/// A form together with the template it was filled from. The template may
/// have been soft-deleted since.
pub async fn get_form_with_template(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<FormWithTemplate> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewForms).await?;
    let form = state
        .forms
        .get_by_id(studio_id, id)
        .await?
        .ok_or_else(|| not_found("consent_form", id))?;
    let template = state.templates.get_by_id(studio_id, form.template_id).await?;
    Ok(ok(FormWithTemplate { form, template }))
}

pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateForm>,
) -> ApiResult<Form> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ManageForms).await?;
    let form = state.forms.update(studio_id, id, body).await?;
    Ok(ok(form))
}

pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ManageForms).await?;
    state.forms.delete(studio_id, id).await?;
    Ok(ok_empty())
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ArchiveRequest {
    pub form_id: Uuid,
    pub template_id: Uuid,
    pub file_path: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_hash: Option<String>,
    pub mime_type: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_fiscal_code: Option<String>,
    pub form_date: DateTime<Utc>,
    pub form_type: String,
    pub metadata: Option<serde_json::Value>,
    pub is_encrypted: Option<bool>,
}

pub async fn archive_pdf(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<ArchiveRequest>,
) -> ApiResult<ArchivedPdf> {
    let (identity, studio_id) = studio_scope(&state, &caller, Operation::ManageArchive).await?;
    let archived = state
        .archive
        .create(CreateArchivedPdf {
            studio_id,
            form_id: body.form_id,
            template_id: body.template_id,
            file_path: body.file_path,
            file_name: body.file_name,
            file_size: body.file_size,
            file_hash: body.file_hash,
            mime_type: body.mime_type,
            client_name: body.client_name,
            client_email: body.client_email,
            client_fiscal_code: body.client_fiscal_code,
            form_date: body.form_date,
            form_type: body.form_type,
            metadata: body.metadata,
            is_encrypted: body.is_encrypted.unwrap_or(false),
            created_by: Some(identity.id),
        })
        .await?;
    Ok(ok(archived))
}

#[derive(Deserialize)]
pub struct ArchiveSearchQuery {
    pub client_name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub template_id: Option<Uuid>,
    pub form_type: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn search_archive(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ArchiveSearchQuery>,
) -> ApiResult<PaginatedResult<ArchivedPdf>> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewArchive).await?;
    let page = PageQuery {
        offset: query.offset,
        limit: query.limit,
    }
    .pagination();
    let filter = ArchivedPdfFilter {
        client_name: query.client_name,
        from: query.from,
        to: query.to,
        template_id: query.template_id,
        form_type: query.form_type,
    };
    let results = state.archive.search(studio_id, filter, page).await?;
    Ok(ok(results))
}

pub async fn archive_stats(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<StorageStats> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewArchive).await?;
    let stats = state.archive.storage_stats(studio_id).await?;
    Ok(ok(stats))
}

pub async fn get_archived_pdf(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<ArchivedPdf> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewArchive).await?;
    let archived = state
        .archive
        .get_by_id(studio_id, id)
        .await?
        .ok_or_else(|| not_found("archived_pdf", id))?;
    Ok(ok(archived))
}

pub async fn get_archived_pdf_for_form(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(form_id): Path<Uuid>,
) -> ApiResult<ArchivedPdf> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ViewArchive).await?;
    let archived = state
        .archive
        .get_by_form(studio_id, form_id)
        .await?
        .ok_or_else(|| not_found("archived_pdf", form_id))?;
    Ok(ok(archived))
}

pub async fn update_archived_pdf(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateArchivedPdf>,
) -> ApiResult<ArchivedPdf> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ManageArchive).await?;
    let archived = state.archive.update(studio_id, id, body).await?;
    Ok(ok(archived))
}

pub async fn delete_archived_pdf(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let (_, studio_id) = studio_scope(&state, &caller, Operation::ManageArchive).await?;
    state.archive.delete(studio_id, id).await?;
    Ok(ok_empty())
}
