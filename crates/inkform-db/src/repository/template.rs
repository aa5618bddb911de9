//! SurrealDB implementation of [`TemplateRepository`].

use chrono::{DateTime, Utc};
use inkform_core::error::InkformResult;
use inkform_core::models::template::{CreateTemplate, Template, UpdateTemplate};
use inkform_core::repository::TemplateRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TemplateRow {
    studio_id: String,
    name: String,
    slug: String,
    description: Option<String>,
    schema: serde_json::Value,
    is_default: bool,
    is_active: bool,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TemplateRow {
    fn into_template(self, id: Uuid) -> Result<Template, DbError> {
        Ok(Template {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            name: self.name,
            slug: self.slug,
            description: self.description,
            schema: self.schema,
            is_default: self.is_default,
            is_active: self.is_active,
            created_by: parse_opt_uuid(self.created_by, "creator")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TemplateRowWithId {
    record_id: String,
    studio_id: String,
    name: String,
    slug: String,
    description: Option<String>,
    schema: serde_json::Value,
    is_default: bool,
    is_active: bool,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TemplateRowWithId {
    fn try_into_template(self) -> Result<Template, DbError> {
        let id = parse_uuid(&self.record_id, "template")?;
        Ok(Template {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            name: self.name,
            slug: self.slug,
            description: self.description,
            schema: self.schema,
            is_default: self.is_default,
            is_active: self.is_active,
            created_by: parse_opt_uuid(self.created_by, "creator")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_uuid(s: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(s: Option<String>, field: &str) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(&v, field)).transpose()
}

/// SurrealDB implementation of the consent template repository.
#[derive(Clone)]
pub struct SurrealTemplateRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTemplateRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TemplateRepository for SurrealTemplateRepository<C> {
    async fn create(&self, input: CreateTemplate) -> InkformResult<Template> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('template', $id) SET \
                 studio_id = $studio_id, \
                 name = $name, \
                 slug = $slug, \
                 description = $description, \
                 schema = $schema, \
                 is_default = $is_default, \
                 is_active = true, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("studio_id", input.studio_id.to_string()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("description", input.description))
            .bind(("schema", input.schema))
            .bind(("is_default", input.is_default))
            .bind(("created_by", input.created_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TemplateRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "template".into(),
            id: id_str,
        })?;

        Ok(row.into_template(id)?)
    }

    async fn get_by_id(&self, studio_id: Uuid, id: Uuid) -> InkformResult<Option<Template>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('template', $id) \
                 WHERE studio_id = $studio_id",
            )
            .bind(("id", id.to_string()))
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TemplateRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_template(id)?)),
            None => Ok(None),
        }
    }

    async fn list_active(&self, studio_id: Uuid) -> InkformResult<Vec<Template>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM template \
                 WHERE studio_id = $studio_id AND is_active = true \
                 ORDER BY created_at DESC",
            )
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TemplateRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_template().map_err(Into::into))
            .collect()
    }

    async fn update(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: UpdateTemplate,
    ) -> InkformResult<Template> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.schema.is_some() {
            sets.push("schema = $schema");
        }
        if input.is_default.is_some() {
            sets.push("is_default = $is_default");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('template', $id) SET {} \
             WHERE studio_id = $studio_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("studio_id", studio_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(schema) = input.schema {
            builder = builder.bind(("schema", schema));
        }
        if let Some(is_default) = input.is_default {
            builder = builder.bind(("is_default", is_default));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TemplateRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "template".into(),
            id: id_str,
        })?;

        Ok(row.into_template(id)?)
    }

    async fn soft_delete(&self, studio_id: Uuid, id: Uuid) -> InkformResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::record('template', $id) SET \
                 is_active = false, updated_at = time::now() \
                 WHERE studio_id = $studio_id",
            )
            .bind(("id", id.to_string()))
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }
}
