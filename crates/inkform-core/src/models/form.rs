//! Consent form instance domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Draft,
    Completed,
    Signed,
    Archived,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Completed => "completed",
            FormStatus::Signed => "signed",
            FormStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(FormStatus::Draft),
            "completed" => Some(FormStatus::Completed),
            "signed" => Some(FormStatus::Signed),
            "archived" => Some(FormStatus::Archived),
            _ => None,
        }
    }
}

/// A filled instance of a template, including client data and signatures.
///
/// `form_data` maps template field ids to values; `signatures` is an array
/// of `{fieldId, imageData, timestamp}` objects (base64-encoded images).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub studio_id: Uuid,
    pub template_id: Uuid,

    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_fiscal_code: Option<String>,

    pub form_data: serde_json::Value,
    pub signatures: serde_json::Value,

    pub status: FormStatus,
    pub form_number: Option<String>,
    pub notes: Option<String>,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub signed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateForm {
    pub studio_id: Uuid,
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
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateForm {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_fiscal_code: Option<String>,
    pub form_data: Option<serde_json::Value>,
    pub signatures: Option<serde_json::Value>,
    pub status: Option<FormStatus>,
    pub form_number: Option<String>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub signed_at: Option<DateTime<Utc>>,
}
