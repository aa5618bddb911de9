//! A SurrealDB-backed identity directory.
//!
//! Deployments that front the service with an external auth provider
//! implement [`IdentityProvider`] and [`SessionResolver`] against that
//! provider instead. This directory keeps identities and sessions in the
//! same SurrealDB instance as the rest of the data, which is enough for
//! single-box installs and for the integration tests.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use inkform_core::error::InkformResult;
use inkform_core::identity::{Identity, IdentityProvider, SessionResolver};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct IdentityRow {
    email: String,
}

#[derive(Debug, SurrealValue)]
struct IdentityRowWithId {
    record_id: String,
    email: String,
}

#[derive(Debug, SurrealValue)]
struct SessionRow {
    identity_id: String,
    expires_at: DateTime<Utc>,
}

fn parse_uuid(s: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
}

/// Identity and session storage over the `identity` and `identity_session`
/// tables.
#[derive(Clone)]
pub struct SurrealIdentityDirectory<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealIdentityDirectory<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Register an active identity, returning it. Used at signup.
    pub async fn register(&self, email: &str) -> InkformResult<Identity> {
        self.create_identity(email, "active").await
    }

    /// Open a session for an identity. Returns the opaque session token.
    pub async fn open_session(
        &self,
        identity_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> InkformResult<String> {
        let token = generate_session_token();

        let result = self
            .db
            .query(
                "CREATE identity_session SET \
                 identity_id = $identity_id, \
                 token = $session_token, \
                 expires_at = $expires_at",
            )
            .bind(("identity_id", identity_id.to_string()))
            .bind(("session_token", token.clone()))
            .bind(("expires_at", expires_at))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(token)
    }

    async fn create_identity(&self, email: &str, status: &str) -> InkformResult<Identity> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('identity', $id) SET \
                 email = $email, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", email.to_string()))
            .bind(("status", status.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "identity".into(),
            id: id_str,
        })?;

        Ok(Identity {
            id,
            email: row.email,
        })
    }
}

#[async_trait]
impl<C: Connection> IdentityProvider for SurrealIdentityDirectory<C> {
    async fn get_by_id(&self, id: Uuid) -> InkformResult<Option<Identity>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('identity', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| Identity {
            id,
            email: row.email,
        }))
    }

    async fn get_by_email(&self, email: &str) -> InkformResult<Option<Identity>> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM identity \
                 WHERE email = $email",
            )
            .bind(("email", email_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdentityRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(Identity {
                id: parse_uuid(&row.record_id, "identity")?,
                email: row.email,
            })),
            None => Ok(None),
        }
    }

    async fn invite(&self, email: &str) -> InkformResult<Identity> {
        let identity = self.create_identity(email, "pending").await?;
        debug!(identity_id = %identity.id, "provisioned pending identity");
        Ok(identity)
    }

    async fn delete(&self, id: Uuid) -> InkformResult<()> {
        let id_str = id.to_string();

        self.db
            .query(
                "DELETE identity_session WHERE identity_id = $id; \
                 DELETE type::record('identity', $id);",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}

#[async_trait]
impl<C: Connection> SessionResolver for SurrealIdentityDirectory<C> {
    async fn resolve(&self, session_token: &str) -> InkformResult<Option<Identity>> {
        let token_owned = session_token.to_string();

        let mut result = self
            .db
            .query(
                "SELECT identity_id, expires_at FROM identity_session \
                 WHERE token = $session_token AND expires_at > time::now()",
            )
            .bind(("session_token", token_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let identity_id = parse_uuid(&row.identity_id, "identity")?;
        self.get_by_id(identity_id).await
    }
}

/// 32 random bytes, base64url without padding.
fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}
