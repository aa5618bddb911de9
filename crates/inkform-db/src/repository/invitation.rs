//! SurrealDB implementation of [`InvitationRepository`].
//!
//! Expiry is enforced at read time: the pending-lookup queries compare
//! `expires_at` against the caller-supplied `now`, so an invitation past
//! its deadline is invisible to the accept/decline path even before the
//! cleanup job persists the `expired` status.

use chrono::{DateTime, Utc};
use inkform_core::error::InkformResult;
use inkform_core::models::invitation::{
    CreateStudioInvitation, InvitationStatus, StudioInvitation,
};
use inkform_core::models::profile::UserRole;
use inkform_core::repository::InvitationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct InvitationRow {
    studio_id: String,
    invited_email: String,
    invited_by: String,
    role: String,
    status: String,
    token: String,
    message: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    declined_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl InvitationRow {
    fn into_invitation(self, id: Uuid) -> Result<StudioInvitation, DbError> {
        Ok(StudioInvitation {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            invited_email: self.invited_email,
            invited_by: parse_uuid(&self.invited_by, "inviter")?,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
            token: self.token,
            message: self.message,
            created_at: self.created_at,
            expires_at: self.expires_at,
            accepted_at: self.accepted_at,
            declined_at: self.declined_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct InvitationRowWithId {
    record_id: String,
    studio_id: String,
    invited_email: String,
    invited_by: String,
    role: String,
    status: String,
    token: String,
    message: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    declined_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl InvitationRowWithId {
    fn try_into_invitation(self) -> Result<StudioInvitation, DbError> {
        let id = parse_uuid(&self.record_id, "invitation")?;
        Ok(StudioInvitation {
            id,
            studio_id: parse_uuid(&self.studio_id, "studio")?,
            invited_email: self.invited_email,
            invited_by: parse_uuid(&self.invited_by, "inviter")?,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
            token: self.token,
            message: self.message,
            created_at: self.created_at,
            expires_at: self.expires_at,
            accepted_at: self.accepted_at,
            declined_at: self.declined_at,
            updated_at: self.updated_at,
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

fn parse_role(s: &str) -> Result<UserRole, DbError> {
    UserRole::parse(s).ok_or_else(|| DbError::Migration(format!("unknown user role: {s}")))
}

fn parse_status(s: &str) -> Result<InvitationStatus, DbError> {
    InvitationStatus::parse(s)
        .ok_or_else(|| DbError::Migration(format!("unknown invitation status: {s}")))
}

/// SurrealDB implementation of the invitation repository.
#[derive(Clone)]
pub struct SurrealInvitationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInvitationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> InvitationRepository for SurrealInvitationRepository<C> {
    async fn create(&self, input: CreateStudioInvitation) -> InkformResult<StudioInvitation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('studio_invitation', $id) SET \
                 studio_id = $studio_id, \
                 invited_email = $invited_email, \
                 invited_by = $invited_by, \
                 role = $role, \
                 status = 'pending', \
                 token = $invite_token, \
                 message = $message, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("studio_id", input.studio_id.to_string()))
            .bind(("invited_email", input.invited_email))
            .bind(("invited_by", input.invited_by.to_string()))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("invite_token", input.token))
            .bind(("message", input.message))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "studio_invitation".into(),
            id: id_str,
        })?;

        Ok(row.into_invitation(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> InkformResult<Option<StudioInvitation>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('studio_invitation', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_invitation(id)?)),
            None => Ok(None),
        }
    }

    async fn get_pending_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> InkformResult<Option<StudioInvitation>> {
        let token_owned = token.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM studio_invitation \
                 WHERE token = $invite_token AND status = 'pending' \
                 AND expires_at > $now",
            )
            .bind(("invite_token", token_owned))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_invitation()?)),
            None => Ok(None),
        }
    }

    async fn find_pending(
        &self,
        studio_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> InkformResult<Option<StudioInvitation>> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM studio_invitation \
                 WHERE studio_id = $studio_id AND invited_email = $email \
                 AND status = 'pending' AND expires_at > $now",
            )
            .bind(("studio_id", studio_id.to_string()))
            .bind(("email", email_owned))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_invitation()?)),
            None => Ok(None),
        }
    }

    async fn list_by_studio(&self, studio_id: Uuid) -> InkformResult<Vec<StudioInvitation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM studio_invitation \
                 WHERE studio_id = $studio_id \
                 ORDER BY created_at DESC",
            )
            .bind(("studio_id", studio_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_invitation().map_err(Into::into))
            .collect()
    }

    async fn list_pending_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> InkformResult<Vec<StudioInvitation>> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM studio_invitation \
                 WHERE invited_email = $email AND status = 'pending' \
                 AND expires_at > $now \
                 ORDER BY created_at DESC",
            )
            .bind(("email", email_owned))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_invitation().map_err(Into::into))
            .collect()
    }

    async fn mark_accepted(&self, id: Uuid, at: DateTime<Utc>) -> InkformResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::record('studio_invitation', $id) SET \
                 status = 'accepted', accepted_at = $at, \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("at", at))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn mark_declined(&self, id: Uuid, at: DateTime<Utc>) -> InkformResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::record('studio_invitation', $id) SET \
                 status = 'declined', declined_at = $at, \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("at", at))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn revert_to_pending(&self, id: Uuid) -> InkformResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::record('studio_invitation', $id) SET \
                 status = 'pending', accepted_at = NONE, \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn refresh(
        &self,
        id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> InkformResult<StudioInvitation> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('studio_invitation', $id) SET \
                 status = 'pending', token = $invite_token, \
                 expires_at = $expires_at, \
                 accepted_at = NONE, declined_at = NONE, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("invite_token", token))
            .bind(("expires_at", expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "studio_invitation".into(),
            id: id_str,
        })?;

        Ok(row.into_invitation(id)?)
    }

    async fn mark_expired_by_email(&self, email: &str) -> InkformResult<u64> {
        let email_owned = email.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM studio_invitation \
                 WHERE invited_email = $email AND status = 'pending' \
                 GROUP ALL",
            )
            .bind(("email", email_owned.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "UPDATE studio_invitation SET status = 'expired', \
                 updated_at = time::now() \
                 WHERE invited_email = $email AND status = 'pending'",
            )
            .bind(("email", email_owned))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }

    async fn delete(&self, id: Uuid) -> InkformResult<()> {
        self.db
            .query("DELETE type::record('studio_invitation', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
