//! SurrealDB implementation of [`ArchivedPdfRepository`].
//!
//! Rows describe the archived file (path, size, hash) and the consent
//! metadata frozen at archival time. The PDF bytes themselves live on
//! disk or in object storage, never in the database.

use chrono::{DateTime, Utc};
use inkform_core::error::InkformResult;
use inkform_core::models::archived_pdf::{
    ArchivedPdf, ArchivedPdfFilter, CreateArchivedPdf, StorageStats, UpdateArchivedPdf,
};
use inkform_core::repository::{ArchivedPdfRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PdfRow {
    studio_id: String,
    form_id: String,
    template_id: String,
    file_path: String,
    file_name: String,
    file_size: u64,
    file_hash: Option<String>,
    mime_type: String,
    client_name: String,
    client_email: Option<String>,
    client_fiscal_code: Option<String>,
    form_date: DateTime<Utc>,
    form_type: String,
    metadata: serde_json::Value,
    is_encrypted: bool,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl PdfRow {
    fn into_pdf(self, id: Uuid) -> Result<ArchivedPdf, DbError> {
        Ok(ArchivedPdf {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            form_id: parse_uuid(&self.form_id, "form")?,
            template_id: parse_uuid(&self.template_id, "template")?,
            file_path: self.file_path,
            file_name: self.file_name,
            file_size: self.file_size,
            file_hash: self.file_hash,
            mime_type: self.mime_type,
            client_name: self.client_name,
            client_email: self.client_email,
            client_fiscal_code: self.client_fiscal_code,
            form_date: self.form_date,
            form_type: self.form_type,
            metadata: self.metadata,
            is_encrypted: self.is_encrypted,
            created_at: self.created_at,
            created_by: parse_opt_uuid(self.created_by, "creator")?,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PdfRowWithId {
    record_id: String,
    studio_id: String,
    form_id: String,
    template_id: String,
    file_path: String,
    file_name: String,
    file_size: u64,
    file_hash: Option<String>,
    mime_type: String,
    client_name: String,
    client_email: Option<String>,
    client_fiscal_code: Option<String>,
    form_date: DateTime<Utc>,
    form_type: String,
    metadata: serde_json::Value,
    is_encrypted: bool,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl PdfRowWithId {
    fn try_into_pdf(self) -> Result<ArchivedPdf, DbError> {
        let id = parse_uuid(&self.record_id, "archived pdf")?;
        Ok(ArchivedPdf {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            form_id: parse_uuid(&self.form_id, "form")?,
            template_id: parse_uuid(&self.template_id, "template")?,
            file_path: self.file_path,
            file_name: self.file_name,
            file_size: self.file_size,
            file_hash: self.file_hash,
            mime_type: self.mime_type,
            client_name: self.client_name,
            client_email: self.client_email,
            client_fiscal_code: self.client_fiscal_code,
            form_date: self.form_date,
            form_type: self.form_type,
            metadata: self.metadata,
            is_encrypted: self.is_encrypted,
            created_at: self.created_at,
            created_by: parse_opt_uuid(self.created_by, "creator")?,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Row struct for the storage stats aggregate.
#[derive(Debug, SurrealValue)]
struct StatsRow {
    document_count: u64,
    total_bytes: u64,
}

fn parse_uuid(s: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(s: Option<String>, field: &str) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(&v, field)).transpose()
}

/// Builds the WHERE clause fragments and owned bind values for a search.
fn filter_clauses(filter: &ArchivedPdfFilter) -> Vec<&'static str> {
    let mut clauses = Vec::new();
    if filter.client_name.is_some() {
        clauses.push("string::lowercase(client_name) CONTAINS $client_name");
    }
    if filter.from.is_some() {
        clauses.push("form_date >= $from");
    }
    if filter.to.is_some() {
        clauses.push("form_date <= $to");
    }
    if filter.template_id.is_some() {
        clauses.push("template_id = $template_id");
    }
    if filter.form_type.is_some() {
        clauses.push("form_type = $form_type");
    }
    clauses
}

/// SurrealDB implementation of the archived PDF repository.
#[derive(Clone)]
pub struct SurrealArchivedPdfRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealArchivedPdfRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ArchivedPdfRepository for SurrealArchivedPdfRepository<C> {
    async fn create(&self, input: CreateArchivedPdf) -> InkformResult<ArchivedPdf> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('archived_pdf', $id) SET \
                 studio_id = $studio_id, \
                 form_id = $form_id, \
                 template_id = $template_id, \
                 file_path = $file_path, \
                 file_name = $file_name, \
                 file_size = $file_size, \
                 file_hash = $file_hash, \
                 mime_type = $mime_type, \
                 client_name = $client_name, \
                 client_email = $client_email, \
                 client_fiscal_code = $client_fiscal_code, \
                 form_date = $form_date, \
                 form_type = $form_type, \
                 metadata = $metadata, \
                 is_encrypted = $is_encrypted, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("studio_id", input.studio_id.to_string()))
            .bind(("form_id", input.form_id.to_string()))
            .bind(("template_id", input.template_id.to_string()))
            .bind(("file_path", input.file_path))
            .bind(("file_name", input.file_name))
            .bind(("file_size", input.file_size))
            .bind(("file_hash", input.file_hash))
            .bind(("mime_type", input.mime_type))
            .bind(("client_name", input.client_name))
            .bind(("client_email", input.client_email))
            .bind(("client_fiscal_code", input.client_fiscal_code))
            .bind(("form_date", input.form_date))
            .bind(("form_type", input.form_type))
            .bind(("metadata", metadata))
            .bind(("is_encrypted", input.is_encrypted))
            .bind(("created_by", input.created_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PdfRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "archived_pdf".into(),
            id: id_str,
        })?;

        Ok(row.into_pdf(id)?)
    }

    async fn get_by_id(&self, studio_id: Uuid, id: Uuid) -> InkformResult<Option<ArchivedPdf>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('archived_pdf', $id) \
                 WHERE studio_id = $studio_id",
            )
            .bind(("id", id.to_string()))
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PdfRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_pdf(id)?)),
            None => Ok(None),
        }
    }

    async fn get_by_form(
        &self,
        studio_id: Uuid,
        form_id: Uuid,
    ) -> InkformResult<Option<ArchivedPdf>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM archived_pdf \
                 WHERE studio_id = $studio_id AND form_id = $form_id",
            )
            .bind(("studio_id", studio_id.to_string()))
            .bind(("form_id", form_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PdfRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_pdf()?)),
            None => Ok(None),
        }
    }

    async fn search(
        &self,
        studio_id: Uuid,
        filter: ArchivedPdfFilter,
        pagination: Pagination,
    ) -> InkformResult<PaginatedResult<ArchivedPdf>> {
        let studio_id_str = studio_id.to_string();

        let mut clauses = vec!["studio_id = $studio_id"];
        clauses.extend(filter_clauses(&filter));
        let where_clause = clauses.join(" AND ");

        let count_query = format!(
            "SELECT count() AS total FROM archived_pdf \
             WHERE {where_clause} GROUP ALL"
        );
        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM archived_pdf \
             WHERE {where_clause} \
             ORDER BY form_date DESC \
             LIMIT $limit START $offset"
        );

        let mut count_builder = self
            .db
            .query(&count_query)
            .bind(("studio_id", studio_id_str.clone()));
        if let Some(name) = &filter.client_name {
            count_builder = count_builder.bind(("client_name", name.to_lowercase()));
        }
        if let Some(from) = filter.from {
            count_builder = count_builder.bind(("from", from));
        }
        if let Some(to) = filter.to {
            count_builder = count_builder.bind(("to", to));
        }
        if let Some(template_id) = filter.template_id {
            count_builder = count_builder.bind(("template_id", template_id.to_string()));
        }
        if let Some(form_type) = &filter.form_type {
            count_builder = count_builder.bind(("form_type", form_type.clone()));
        }

        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut builder = self
            .db
            .query(&list_query)
            .bind(("studio_id", studio_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(name) = &filter.client_name {
            builder = builder.bind(("client_name", name.to_lowercase()));
        }
        if let Some(from) = filter.from {
            builder = builder.bind(("from", from));
        }
        if let Some(to) = filter.to {
            builder = builder.bind(("to", to));
        }
        if let Some(template_id) = filter.template_id {
            builder = builder.bind(("template_id", template_id.to_string()));
        }
        if let Some(form_type) = filter.form_type {
            builder = builder.bind(("form_type", form_type));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<PdfRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_pdf())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: UpdateArchivedPdf,
    ) -> InkformResult<ArchivedPdf> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        if input.is_encrypted.is_some() {
            sets.push("is_encrypted = $is_encrypted");
        }

        if sets.is_empty() {
            return self.get_by_id(studio_id, id).await?.ok_or_else(|| {
                DbError::NotFound {
                    entity: "archived_pdf".into(),
                    id: id_str,
                }
                .into()
            });
        }

        let query = format!(
            "UPDATE type::record('archived_pdf', $id) SET {} \
             WHERE studio_id = $studio_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("studio_id", studio_id.to_string()));

        if let Some(metadata) = input.metadata {
            builder = builder.bind(("metadata", metadata));
        }
        if let Some(is_encrypted) = input.is_encrypted {
            builder = builder.bind(("is_encrypted", is_encrypted));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PdfRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "archived_pdf".into(),
            id: id_str,
        })?;

        Ok(row.into_pdf(id)?)
    }

    async fn delete(&self, studio_id: Uuid, id: Uuid) -> InkformResult<()> {
        self.db
            .query(
                "DELETE archived_pdf \
                 WHERE meta::id(id) = $id AND studio_id = $studio_id",
            )
            .bind(("id", id.to_string()))
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn storage_stats(&self, studio_id: Uuid) -> InkformResult<StorageStats> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS document_count, \
                 math::sum(file_size) AS total_bytes \
                 FROM archived_pdf \
                 WHERE studio_id = $studio_id GROUP ALL",
            )
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StatsRow> = result.take(0).map_err(DbError::from)?;
        let stats = rows
            .into_iter()
            .next()
            .map(|row| StorageStats {
                document_count: row.document_count,
                total_bytes: row.total_bytes,
            })
            .unwrap_or(StorageStats {
                document_count: 0,
                total_bytes: 0,
            });

        Ok(stats)
    }
}
