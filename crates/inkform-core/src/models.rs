//! Domain models for Inkform.
//!
//! These are the core types shared across all crates.

pub mod archived_pdf;
pub mod form;
pub mod invitation;
pub mod profile;
pub mod studio;
pub mod template;
