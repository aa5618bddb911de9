//! Studio domain model.
//!
//! A studio is a tenant organization. All templates, forms, and archived
//! PDFs are scoped to a studio; members are bound to it through their
//! profile's `studio_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant organization (a tattoo studio).
///
/// The identity that created the studio is its owner and implicitly holds
/// every permission on it; ownership is an attribute, not a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Studio {
    pub id: Uuid,
    pub name: String,
    /// URL-safe identifier derived from the name. Unique among active
    /// studios.
    pub slug: String,
    pub owner_id: Uuid,

    // Contact information.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,

    // Address.
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_province: Option<String>,
    pub address_postal_code: Option<String>,
    pub address_country: Option<String>,

    // Business registration (Italian studios).
    pub partita_iva: Option<String>,
    pub codice_fiscale: Option<String>,
    pub business_name: Option<String>,

    /// Free-form per-studio settings (branding, retention, defaults).
    pub settings: serde_json::Value,
    /// Soft-delete flag.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new studio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudio {
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
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

/// Fields that can be updated on an existing studio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudio {
    pub name: Option<String>,
    pub slug: Option<String>,
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
