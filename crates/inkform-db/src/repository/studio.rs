//! SurrealDB implementation of [`StudioRepository`].

use chrono::{DateTime, Utc};
use inkform_core::error::InkformResult;
use inkform_core::models::studio::{CreateStudio, Studio, UpdateStudio};
use inkform_core::repository::StudioRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct StudioRow {
    name: String,
    slug: String,
    owner_id: String,
    email: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    address_street: Option<String>,
    address_city: Option<String>,
    address_province: Option<String>,
    address_postal_code: Option<String>,
    address_country: Option<String>,
    partita_iva: Option<String>,
    codice_fiscale: Option<String>,
    business_name: Option<String>,
    settings: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudioRow {
    fn into_studio(self, id: Uuid) -> Result<Studio, DbError> {
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| DbError::Migration(format!("invalid owner UUID: {e}")))?;
        Ok(Studio {
            id,
            name: self.name,
            slug: self.slug,
            owner_id,
            email: self.email,
            phone: self.phone,
            website: self.website,
            address_street: self.address_street,
            address_city: self.address_city,
            address_province: self.address_province,
            address_postal_code: self.address_postal_code,
            address_country: self.address_country,
            partita_iva: self.partita_iva,
            codice_fiscale: self.codice_fiscale,
            business_name: self.business_name,
            settings: self.settings,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct StudioRowWithId {
    record_id: String,
    name: String,
    slug: String,
    owner_id: String,
    email: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    address_street: Option<String>,
    address_city: Option<String>,
    address_province: Option<String>,
    address_postal_code: Option<String>,
    address_country: Option<String>,
    partita_iva: Option<String>,
    codice_fiscale: Option<String>,
    business_name: Option<String>,
    settings: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudioRowWithId {
    fn try_into_studio(self) -> Result<Studio, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| DbError::Migration(format!("invalid owner UUID: {e}")))?;
        Ok(Studio {
            id,
            name: self.name,
            slug: self.slug,
            owner_id,
            email: self.email,
            phone: self.phone,
            website: self.website,
            address_street: self.address_street,
            address_city: self.address_city,
            address_province: self.address_province,
            address_postal_code: self.address_postal_code,
            address_country: self.address_country,
            partita_iva: self.partita_iva,
            codice_fiscale: self.codice_fiscale,
            business_name: self.business_name,
            settings: self.settings,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the studio repository.
#[derive(Clone)]
pub struct SurrealStudioRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStudioRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> StudioRepository for SurrealStudioRepository<C> {
    async fn create(&self, input: CreateStudio) -> InkformResult<Studio> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let settings = input
            .settings
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('studio', $id) SET \
                 name = $name, \
                 slug = $slug, \
                 owner_id = $owner_id, \
                 email = $email, \
                 phone = $phone, \
                 website = $website, \
                 address_street = $address_street, \
                 address_city = $address_city, \
                 address_province = $address_province, \
                 address_postal_code = $address_postal_code, \
                 address_country = $address_country, \
                 partita_iva = $partita_iva, \
                 codice_fiscale = $codice_fiscale, \
                 business_name = $business_name, \
                 settings = $settings, \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("website", input.website))
            .bind(("address_street", input.address_street))
            .bind(("address_city", input.address_city))
            .bind(("address_province", input.address_province))
            .bind(("address_postal_code", input.address_postal_code))
            .bind(("address_country", input.address_country))
            .bind(("partita_iva", input.partita_iva))
            .bind(("codice_fiscale", input.codice_fiscale))
            .bind(("business_name", input.business_name))
            .bind(("settings", settings))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<StudioRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "studio".into(),
            id: id_str,
        })?;

        Ok(row.into_studio(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> InkformResult<Option<Studio>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('studio', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StudioRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_studio(id)?)),
            None => Ok(None),
        }
    }

    async fn get_active_by_slug(&self, slug: &str) -> InkformResult<Option<Studio>> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM studio \
                 WHERE slug = $slug AND is_active = true",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StudioRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_studio()?)),
            None => Ok(None),
        }
    }

    async fn get_active_by_owner(&self, owner_id: Uuid) -> InkformResult<Option<Studio>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM studio \
                 WHERE owner_id = $owner_id AND is_active = true",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StudioRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_studio()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateStudio) -> InkformResult<Studio> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.website.is_some() {
            sets.push("website = $website");
        }
        if input.address_street.is_some() {
            sets.push("address_street = $address_street");
        }
        if input.address_city.is_some() {
            sets.push("address_city = $address_city");
        }
        if input.address_province.is_some() {
            sets.push("address_province = $address_province");
        }
        if input.address_postal_code.is_some() {
            sets.push("address_postal_code = $address_postal_code");
        }
        if input.address_country.is_some() {
            sets.push("address_country = $address_country");
        }
        if input.partita_iva.is_some() {
            sets.push("partita_iva = $partita_iva");
        }
        if input.codice_fiscale.is_some() {
            sets.push("codice_fiscale = $codice_fiscale");
        }
        if input.business_name.is_some() {
            sets.push("business_name = $business_name");
        }
        if input.settings.is_some() {
            sets.push("settings = $settings");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('studio', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(website) = input.website {
            builder = builder.bind(("website", website));
        }
        if let Some(v) = input.address_street {
            builder = builder.bind(("address_street", v));
        }
        if let Some(v) = input.address_city {
            builder = builder.bind(("address_city", v));
        }
        if let Some(v) = input.address_province {
            builder = builder.bind(("address_province", v));
        }
        if let Some(v) = input.address_postal_code {
            builder = builder.bind(("address_postal_code", v));
        }
        if let Some(v) = input.address_country {
            builder = builder.bind(("address_country", v));
        }
        if let Some(v) = input.partita_iva {
            builder = builder.bind(("partita_iva", v));
        }
        if let Some(v) = input.codice_fiscale {
            builder = builder.bind(("codice_fiscale", v));
        }
        if let Some(v) = input.business_name {
            builder = builder.bind(("business_name", v));
        }
        if let Some(settings) = input.settings {
            builder = builder.bind(("settings", settings));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<StudioRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "studio".into(),
            id: id_str,
        })?;

        Ok(row.into_studio(id)?)
    }

    async fn soft_delete(&self, id: Uuid) -> InkformResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::record('studio', $id) SET \
                 is_active = false, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }
}
