//! SurrealDB implementation of [`ProfileRepository`].
//!
//! The record id of a `user_profile` row is the external identity's UUID,
//! so point lookups never need a secondary index.

use chrono::{DateTime, Utc};
use inkform_core::error::InkformResult;
use inkform_core::models::profile::{
    CreateUserProfile, ProfileStatus, UpdateUserProfile, UserProfile, UserRole,
};
use inkform_core::repository::ProfileRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ProfileRow {
    role: String,
    studio_id: Option<String>,
    status: String,
    invited_by: Option<String>,
    invited_at: Option<DateTime<Utc>>,
    accepted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProfileRowWithId {
    record_id: String,
    role: String,
    studio_id: Option<String>,
    status: String,
    invited_by: Option<String>,
    invited_at: Option<DateTime<Utc>>,
    accepted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_role(s: &str) -> Result<UserRole, DbError> {
    UserRole::parse(s).ok_or_else(|| DbError::Migration(format!("unknown user role: {s}")))
}

fn parse_status(s: &str) -> Result<ProfileStatus, DbError> {
    ProfileStatus::parse(s)
        .ok_or_else(|| DbError::Migration(format!("unknown profile status: {s}")))
}

fn parse_opt_uuid(s: Option<String>, field: &str) -> Result<Option<Uuid>, DbError> {
    s.map(|v| {
        Uuid::parse_str(&v).map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
    })
    .transpose()
}

impl ProfileRow {
    fn into_profile(self, user_id: Uuid) -> Result<UserProfile, DbError> {
        Ok(UserProfile {
            user_id,
            role: parse_role(&self.role)?,
            studio_id: parse_opt_uuid(self.studio_id, "studio")?,
            status: parse_status(&self.status)?,
            invited_by: parse_opt_uuid(self.invited_by, "inviter")?,
            invited_at: self.invited_at,
            accepted_at: self.accepted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<UserProfile, DbError> {
        let user_id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(UserProfile {
            user_id,
            role: parse_role(&self.role)?,
            studio_id: parse_opt_uuid(self.studio_id, "studio")?,
            status: parse_status(&self.status)?,
            invited_by: parse_opt_uuid(self.invited_by, "inviter")?,
            invited_at: self.invited_at,
            accepted_at: self.accepted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the profile repository.
#[derive(Clone)]
pub struct SurrealProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfileRepository for SurrealProfileRepository<C> {
    async fn create(&self, input: CreateUserProfile) -> InkformResult<UserProfile> {
        let user_id = input.user_id;
        let id_str = user_id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user_profile', $id) SET \
                 role = $role, \
                 studio_id = $studio_id, \
                 status = $status, \
                 invited_by = $invited_by, \
                 invited_at = $invited_at, \
                 accepted_at = $accepted_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("studio_id", input.studio_id.map(|s| s.to_string())))
            .bind(("status", input.status.as_str().to_string()))
            .bind(("invited_by", input.invited_by.map(|s| s.to_string())))
            .bind(("invited_at", input.invited_at))
            .bind(("accepted_at", input.accepted_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(user_id)?)
    }

    async fn get(&self, user_id: Uuid) -> InkformResult<Option<UserProfile>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user_profile', $id)")
            .bind(("id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_profile(user_id)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, user_id: Uuid, input: UpdateUserProfile) -> InkformResult<UserProfile> {
        let id_str = user_id.to_string();

        let mut sets = Vec::new();
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.studio_id.is_some() {
            sets.push("studio_id = $studio_id");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.accepted_at.is_some() {
            sets.push("accepted_at = $accepted_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user_profile', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }
        if let Some(studio_id) = input.studio_id {
            builder = builder.bind(("studio_id", studio_id.to_string()));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(accepted_at) = input.accepted_at {
            builder = builder.bind(("accepted_at", accepted_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(user_id)?)
    }

    async fn delete(&self, user_id: Uuid) -> InkformResult<()> {
        self.db
            .query("DELETE type::record('user_profile', $id)")
            .bind(("id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_active_by_studio(&self, studio_id: Uuid) -> InkformResult<Vec<UserProfile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_profile \
                 WHERE studio_id = $studio_id AND status = 'active' \
                 ORDER BY created_at",
            )
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_profile().map_err(Into::into))
            .collect()
    }

    async fn list_pending_invited_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> InkformResult<Vec<UserProfile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_profile \
                 WHERE status = 'pending' AND invited_at != NONE \
                 AND invited_at < $cutoff",
            )
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_profile().map_err(Into::into))
            .collect()
    }

    async fn deactivate_by_studio(&self, studio_id: Uuid) -> InkformResult<u64> {
        let studio_id_str = studio_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM user_profile \
                 WHERE studio_id = $studio_id AND status != 'inactive' \
                 GROUP ALL",
            )
            .bind(("studio_id", studio_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "UPDATE user_profile SET status = 'inactive', \
                 updated_at = time::now() \
                 WHERE studio_id = $studio_id AND status != 'inactive'",
            )
            .bind(("studio_id", studio_id_str))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
