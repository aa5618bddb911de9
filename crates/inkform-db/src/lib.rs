//! Inkform Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbConfig`], [`DbManager`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Implementations of the `inkform-core` repository traits
//! - An embedded identity directory ([`directory::SurrealIdentityDirectory`])
//!   for deployments without an external identity provider

pub mod directory;
pub mod repository;

mod connection;
mod error;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
