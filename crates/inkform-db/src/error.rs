//! Database-specific error types and conversions.

use inkform_core::error::InkformError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for InkformError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => InkformError::NotFound { entity, id },
            other => InkformError::Database(other.to_string()),
        }
    }
}
