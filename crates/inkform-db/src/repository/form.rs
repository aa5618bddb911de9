//! SurrealDB implementation of [`FormRepository`].
//!
//! Every query is scoped by `studio_id` so a form from another studio is
//! unreachable even with a valid record ID.

use chrono::{DateTime, Utc};
use inkform_core::error::InkformResult;
use inkform_core::models::form::{CreateForm, Form, FormStatus, UpdateForm};
use inkform_core::repository::{FormRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct FormRow {
    studio_id: String,
    template_id: String,
    client_name: String,
    client_email: Option<String>,
    client_phone: Option<String>,
    client_fiscal_code: Option<String>,
    form_data: serde_json::Value,
    signatures: serde_json::Value,
    status: String,
    form_number: Option<String>,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    signed_at: Option<DateTime<Utc>>,
}

impl FormRow {
    fn into_form(self, id: Uuid) -> Result<Form, DbError> {
        Ok(Form {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            template_id: parse_uuid(&self.template_id, "template")?,
            client_name: self.client_name,
            client_email: self.client_email,
            client_phone: self.client_phone,
            client_fiscal_code: self.client_fiscal_code,
            form_data: self.form_data,
            signatures: self.signatures,
            status: parse_status(&self.status)?,
            form_number: self.form_number,
            notes: self.notes,
            created_by: parse_opt_uuid(self.created_by, "creator")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            signed_at: self.signed_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct FormRowWithId {
    record_id: String,
    studio_id: String,
    template_id: String,
    client_name: String,
    client_email: Option<String>,
    client_phone: Option<String>,
    client_fiscal_code: Option<String>,
    form_data: serde_json::Value,
    signatures: serde_json::Value,
    status: String,
    form_number: Option<String>,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    signed_at: Option<DateTime<Utc>>,
}

impl FormRowWithId {
    fn try_into_form(self) -> Result<Form, DbError> {
        let id = parse_uuid(&self.record_id, "form")?;
        Ok(Form {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            template_id: parse_uuid(&self.template_id, "template")?,
            client_name: self.client_name,
            client_email: self.client_email,
            client_phone: self.client_phone,
            client_fiscal_code: self.client_fiscal_code,
            form_data: self.form_data,
            signatures: self.signatures,
            status: parse_status(&self.status)?,
            form_number: self.form_number,
            notes: self.notes,
            created_by: parse_opt_uuid(self.created_by, "creator")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            signed_at: self.signed_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(s: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(s: Option<String>, field: &str) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(&v, field)).transpose()
}

fn parse_status(s: &str) -> Result<FormStatus, DbError> {
    FormStatus::parse(s).ok_or_else(|| DbError::Migration(format!("unknown form status: {s}")))
}

/// SurrealDB implementation of the consent form repository.
#[derive(Clone)]
pub struct SurrealFormRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFormRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> FormRepository for SurrealFormRepository<C> {
    async fn create(&self, input: CreateForm) -> InkformResult<Form> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let status = input.status.unwrap_or(FormStatus::Draft);
        let form_data = input
            .form_data
            .unwrap_or(serde_json::Value::Object(Default::default()));
        let signatures = input
            .signatures
            .unwrap_or(serde_json::Value::Array(Vec::new()));

        let result = self
            .db
            .query(
                "CREATE type::record('consent_form', $id) SET \
                 studio_id = $studio_id, \
                 template_id = $template_id, \
                 client_name = $client_name, \
                 client_email = $client_email, \
                 client_phone = $client_phone, \
                 client_fiscal_code = $client_fiscal_code, \
                 form_data = $form_data, \
                 signatures = $signatures, \
                 status = $status, \
                 form_number = $form_number, \
                 notes = $notes, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("studio_id", input.studio_id.to_string()))
            .bind(("template_id", input.template_id.to_string()))
            .bind(("client_name", input.client_name))
            .bind(("client_email", input.client_email))
            .bind(("client_phone", input.client_phone))
            .bind(("client_fiscal_code", input.client_fiscal_code))
            .bind(("form_data", form_data))
            .bind(("signatures", signatures))
            .bind(("status", status.as_str().to_string()))
            .bind(("form_number", input.form_number))
            .bind(("notes", input.notes))
            .bind(("created_by", input.created_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<FormRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "consent_form".into(),
            id: id_str,
        })?;

        Ok(row.into_form(id)?)
    }

    async fn get_by_id(&self, studio_id: Uuid, id: Uuid) -> InkformResult<Option<Form>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('consent_form', $id) \
                 WHERE studio_id = $studio_id",
            )
            .bind(("id", id.to_string()))
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FormRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_form(id)?)),
            None => Ok(None),
        }
    }

    async fn list_by_studio(
        &self,
        studio_id: Uuid,
        pagination: Pagination,
    ) -> InkformResult<PaginatedResult<Form>> {
        let studio_id_str = studio_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM consent_form \
                 WHERE studio_id = $studio_id GROUP ALL",
            )
            .bind(("studio_id", studio_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM consent_form \
                 WHERE studio_id = $studio_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("studio_id", studio_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FormRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_form())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(&self, studio_id: Uuid, id: Uuid, input: UpdateForm) -> InkformResult<Form> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.client_name.is_some() {
            sets.push("client_name = $client_name");
        }
        if input.client_email.is_some() {
            sets.push("client_email = $client_email");
        }
        if input.client_phone.is_some() {
            sets.push("client_phone = $client_phone");
        }
        if input.client_fiscal_code.is_some() {
            sets.push("client_fiscal_code = $client_fiscal_code");
        }
        if input.form_data.is_some() {
            sets.push("form_data = $form_data");
        }
        if input.signatures.is_some() {
            sets.push("signatures = $signatures");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.form_number.is_some() {
            sets.push("form_number = $form_number");
        }
        if input.notes.is_some() {
            sets.push("notes = $notes");
        }
        if input.completed_at.is_some() {
            sets.push("completed_at = $completed_at");
        }
        if input.signed_at.is_some() {
            sets.push("signed_at = $signed_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('consent_form', $id) SET {} \
             WHERE studio_id = $studio_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("studio_id", studio_id.to_string()));

        if let Some(v) = input.client_name {
            builder = builder.bind(("client_name", v));
        }
        if let Some(v) = input.client_email {
            builder = builder.bind(("client_email", v));
        }
        if let Some(v) = input.client_phone {
            builder = builder.bind(("client_phone", v));
        }
        if let Some(v) = input.client_fiscal_code {
            builder = builder.bind(("client_fiscal_code", v));
        }
        if let Some(v) = input.form_data {
            builder = builder.bind(("form_data", v));
        }
        if let Some(v) = input.signatures {
            builder = builder.bind(("signatures", v));
        }
        if let Some(v) = input.status {
            builder = builder.bind(("status", v.as_str().to_string()));
        }
        if let Some(v) = input.form_number {
            builder = builder.bind(("form_number", v));
        }
        if let Some(v) = input.notes {
            builder = builder.bind(("notes", v));
        }
        if let Some(v) = input.completed_at {
            builder = builder.bind(("completed_at", v));
        }
        if let Some(v) = input.signed_at {
            builder = builder.bind(("signed_at", v));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<FormRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "consent_form".into(),
            id: id_str,
        })?;

        Ok(row.into_form(id)?)
    }

    async fn delete(&self, studio_id: Uuid, id: Uuid) -> InkformResult<()> {
        self.db
            .query(
                "DELETE consent_form \
                 WHERE meta::id(id) = $id AND studio_id = $studio_id",
            )
            .bind(("id", id.to_string()))
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn search_by_client_name(
        &self,
        studio_id: Uuid,
        client_name: &str,
    ) -> InkformResult<Vec<Form>> {
        let needle = client_name.to_lowercase();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM consent_form \
                 WHERE studio_id = $studio_id \
                 AND string::lowercase(client_name) CONTAINS $needle \
                 ORDER BY created_at DESC",
            )
            .bind(("studio_id", studio_id.to_string()))
            .bind(("needle", needle))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FormRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_form().map_err(Into::into))
            .collect()
    }

    async fn list_by_date_range(
        &self,
        studio_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> InkformResult<Vec<Form>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM consent_form \
                 WHERE studio_id = $studio_id \
                 AND created_at >= $from AND created_at <= $to \
                 ORDER BY created_at DESC",
            )
            .bind(("studio_id", studio_id.to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FormRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_form().map_err(Into::into))
            .collect()
    }
}
