//! Archived PDF domain model: metadata about rendered consent form
//! artifacts. Rendering itself happens outside this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedPdf {
    pub id: Uuid,
    pub studio_id: Uuid,
    pub form_id: Uuid,
    pub template_id: Uuid,

    // File information.
    pub file_path: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_hash: Option<String>,
    pub mime_type: String,

    // Searchable metadata, denormalized from the form.
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_fiscal_code: Option<String>,
    pub form_date: DateTime<Utc>,
    pub form_type: String,

    pub metadata: serde_json::Value,
    pub is_encrypted: bool,

    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArchivedPdf {
    pub studio_id: Uuid,
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
    pub is_encrypted: bool,
    pub created_by: Option<Uuid>,
}

/// Only metadata-ish fields can change after archival.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArchivedPdf {
    pub metadata: Option<serde_json::Value>,
    pub is_encrypted: Option<bool>,
}

/// Search filters for the archive.
#[derive(Debug, Clone, Default)]
pub struct ArchivedPdfFilter {
    pub client_name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub template_id: Option<Uuid>,
    pub form_type: Option<String>,
}

/// Per-studio storage usage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageStats {
    pub document_count: u64,
    pub total_bytes: u64,
}
