//! Inkform Core — domain models, the role/permission table, and the
//! repository trait definitions shared across all crates.

pub mod error;
pub mod identity;
pub mod models;
pub mod permissions;
pub mod repository;

pub use error::{InkformError, InkformResult};
