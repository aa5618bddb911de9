//! Error types for the Inkform system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InkformError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InkformResult<T> = Result<T, InkformError>;
