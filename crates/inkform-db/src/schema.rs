//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- User profiles (global scope; record id = external identity id)
-- =======================================================================
DEFINE TABLE user_profile SCHEMAFULL;
DEFINE FIELD role ON TABLE user_profile TYPE string \
    ASSERT $value IN ['studio_admin', 'studio_member'];
DEFINE FIELD studio_id ON TABLE user_profile TYPE option<string>;
DEFINE FIELD status ON TABLE user_profile TYPE string \
    ASSERT $value IN ['active', 'pending', 'inactive'];
DEFINE FIELD invited_by ON TABLE user_profile TYPE option<string>;
DEFINE FIELD invited_at ON TABLE user_profile TYPE option<datetime>;
DEFINE FIELD accepted_at ON TABLE user_profile TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user_profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user_profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_profile_studio ON TABLE user_profile COLUMNS studio_id;

-- =======================================================================
-- Studios (tenant organizations)
-- =======================================================================
DEFINE TABLE studio SCHEMAFULL;
DEFINE FIELD name ON TABLE studio TYPE string;
DEFINE FIELD slug ON TABLE studio TYPE string;
DEFINE FIELD owner_id ON TABLE studio TYPE string;
DEFINE FIELD email ON TABLE studio TYPE option<string>;
DEFINE FIELD phone ON TABLE studio TYPE option<string>;
DEFINE FIELD website ON TABLE studio TYPE option<string>;
DEFINE FIELD address_street ON TABLE studio TYPE option<string>;
DEFINE FIELD address_city ON TABLE studio TYPE option<string>;
DEFINE FIELD address_province ON TABLE studio TYPE option<string>;
DEFINE FIELD address_postal_code ON TABLE studio TYPE option<string>;
DEFINE FIELD address_country ON TABLE studio TYPE option<string>;
DEFINE FIELD partita_iva ON TABLE studio TYPE option<string>;
DEFINE FIELD codice_fiscale ON TABLE studio TYPE option<string>;
DEFINE FIELD business_name ON TABLE studio TYPE option<string>;
DEFINE FIELD settings ON TABLE studio TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD is_active ON TABLE studio TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE studio TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE studio TYPE datetime DEFAULT time::now();
-- Slug uniqueness holds among active studios only, so the index is
-- non-unique and the service layer enforces the invariant.
DEFINE INDEX idx_studio_slug ON TABLE studio COLUMNS slug;
DEFINE INDEX idx_studio_owner ON TABLE studio COLUMNS owner_id;

-- =======================================================================
-- Studio invitations
-- =======================================================================
DEFINE TABLE studio_invitation SCHEMAFULL;
DEFINE FIELD studio_id ON TABLE studio_invitation TYPE string;
DEFINE FIELD invited_email ON TABLE studio_invitation TYPE string;
DEFINE FIELD invited_by ON TABLE studio_invitation TYPE string;
DEFINE FIELD role ON TABLE studio_invitation TYPE string \
    ASSERT $value IN ['studio_admin', 'studio_member'];
DEFINE FIELD status ON TABLE studio_invitation TYPE string \
    ASSERT $value IN ['pending', 'accepted', 'declined', 'expired'];
DEFINE FIELD token ON TABLE studio_invitation TYPE string;
DEFINE FIELD message ON TABLE studio_invitation TYPE option<string>;
DEFINE FIELD expires_at ON TABLE studio_invitation TYPE datetime;
DEFINE FIELD accepted_at ON TABLE studio_invitation TYPE option<datetime>;
DEFINE FIELD declined_at ON TABLE studio_invitation TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE studio_invitation TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE studio_invitation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_invitation_token ON TABLE studio_invitation \
    COLUMNS token UNIQUE;
DEFINE INDEX idx_invitation_studio_email ON TABLE studio_invitation \
    COLUMNS studio_id, invited_email;

-- =======================================================================
-- Templates (studio scope)
-- =======================================================================
DEFINE TABLE template SCHEMAFULL;
DEFINE FIELD studio_id ON TABLE template TYPE string;
DEFINE FIELD name ON TABLE template TYPE string;
DEFINE FIELD slug ON TABLE template TYPE string;
DEFINE FIELD description ON TABLE template TYPE option<string>;
DEFINE FIELD schema ON TABLE template TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD is_default ON TABLE template TYPE bool DEFAULT false;
DEFINE FIELD is_active ON TABLE template TYPE bool DEFAULT true;
DEFINE FIELD created_by ON TABLE template TYPE option<string>;
DEFINE FIELD created_at ON TABLE template TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE template TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_template_studio ON TABLE template COLUMNS studio_id;

-- =======================================================================
-- Consent forms (studio scope)
-- =======================================================================
DEFINE TABLE consent_form SCHEMAFULL;
DEFINE FIELD studio_id ON TABLE consent_form TYPE string;
DEFINE FIELD template_id ON TABLE consent_form TYPE string;
DEFINE FIELD client_name ON TABLE consent_form TYPE string;
DEFINE FIELD client_email ON TABLE consent_form TYPE option<string>;
DEFINE FIELD client_phone ON TABLE consent_form TYPE option<string>;
DEFINE FIELD client_fiscal_code ON TABLE consent_form TYPE option<string>;
DEFINE FIELD form_data ON TABLE consent_form TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD signatures ON TABLE consent_form TYPE array<object> FLEXIBLE \
    DEFAULT [];
DEFINE FIELD status ON TABLE consent_form TYPE string \
    ASSERT $value IN ['draft', 'completed', 'signed', 'archived'];
DEFINE FIELD form_number ON TABLE consent_form TYPE option<string>;
DEFINE FIELD notes ON TABLE consent_form TYPE option<string>;
DEFINE FIELD created_by ON TABLE consent_form TYPE option<string>;
DEFINE FIELD created_at ON TABLE consent_form TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE consent_form TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD completed_at ON TABLE consent_form TYPE option<datetime>;
DEFINE FIELD signed_at ON TABLE consent_form TYPE option<datetime>;
DEFINE INDEX idx_form_studio ON TABLE consent_form COLUMNS studio_id;
DEFINE INDEX idx_form_client ON TABLE consent_form \
    COLUMNS studio_id, client_name;

-- =======================================================================
-- Archived PDFs (studio scope)
-- =======================================================================
DEFINE TABLE archived_pdf SCHEMAFULL;
DEFINE FIELD studio_id ON TABLE archived_pdf TYPE string;
DEFINE FIELD form_id ON TABLE archived_pdf TYPE string;
DEFINE FIELD template_id ON TABLE archived_pdf TYPE string;
DEFINE FIELD file_path ON TABLE archived_pdf TYPE string;
DEFINE FIELD file_name ON TABLE archived_pdf TYPE string;
DEFINE FIELD file_size ON TABLE archived_pdf TYPE int;
DEFINE FIELD file_hash ON TABLE archived_pdf TYPE option<string>;
DEFINE FIELD mime_type ON TABLE archived_pdf TYPE string \
    DEFAULT 'application/pdf';
DEFINE FIELD client_name ON TABLE archived_pdf TYPE string;
DEFINE FIELD client_email ON TABLE archived_pdf TYPE option<string>;
DEFINE FIELD client_fiscal_code ON TABLE archived_pdf TYPE option<string>;
DEFINE FIELD form_date ON TABLE archived_pdf TYPE datetime;
DEFINE FIELD form_type ON TABLE archived_pdf TYPE string;
DEFINE FIELD metadata ON TABLE archived_pdf TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD is_encrypted ON TABLE archived_pdf TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE archived_pdf TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE archived_pdf TYPE option<string>;
DEFINE INDEX idx_pdf_studio ON TABLE archived_pdf COLUMNS studio_id;
DEFINE INDEX idx_pdf_form ON TABLE archived_pdf COLUMNS studio_id, form_id;

-- =======================================================================
-- Embedded identity directory (used when no external provider is wired)
-- =======================================================================
DEFINE TABLE identity SCHEMAFULL;
DEFINE FIELD email ON TABLE identity TYPE string;
DEFINE FIELD status ON TABLE identity TYPE string \
    ASSERT $value IN ['pending', 'active'];
DEFINE FIELD created_at ON TABLE identity TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_identity_email ON TABLE identity COLUMNS email UNIQUE;

DEFINE TABLE identity_session SCHEMAFULL;
DEFINE FIELD identity_id ON TABLE identity_session TYPE string;
DEFINE FIELD token ON TABLE identity_session TYPE string;
DEFINE FIELD expires_at ON TABLE identity_session TYPE datetime;
DEFINE FIELD created_at ON TABLE identity_session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token ON TABLE identity_session \
    COLUMNS token UNIQUE;
DEFINE INDEX idx_session_identity ON TABLE identity_session \
    COLUMNS identity_id;
";

// -----------------------------------------------------------------------
// Runner
// -----------------------------------------------------------------------

/// Apply all pending migrations, in order.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await
        .map_err(DbError::from)?
        .check()
        .map_err(|e| DbError::Migration(format!("migration table DDL: {e}")))?;

    let mut applied = db
        .query("SELECT version, name FROM _migration ORDER BY version")
        .await
        .map_err(DbError::from)?;
    let applied: Vec<MigrationRecord> = applied.take(0).map_err(DbError::from)?;
    let latest = applied.iter().map(|m| m.version).max().unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > latest) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        db.query(migration.sql)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| {
                DbError::Migration(format!("migration {} failed: {e}", migration.version))
            })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "recording migration {} failed: {e}",
                    migration.version
                ))
            })?;
    }

    Ok(())
}
