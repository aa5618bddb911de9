//! Consent form template domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable schema of typed fields defining a consent form's structure.
///
/// The `schema` value is `{ "fields": [...] }` where each field carries an
/// `id`, a `type` (`text`, `date`, `checkbox`, `signature`), a `label`, and
/// type-specific options. The editor producing it is client-side; the
/// backend stores it opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub studio_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
    pub is_default: bool,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub studio_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
    pub is_default: bool,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
    pub is_default: Option<bool>,
}
