//! Inkform Access — studio membership, invitation lifecycle and
//! per-request access decisions.
//!
//! Services are generic over the `inkform-core` repository traits so this
//! crate has no dependency on the database crate.

pub mod cleanup;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod invitation;
pub mod slug;
pub mod studio;
pub mod token;

pub use cleanup::{CleanupReport, CleanupService};
pub use config::InvitationConfig;
pub use context::AuthContext;
pub use error::AccessError;
pub use gate::{AccessGate, Decision, PathCategory, SessionState};
pub use invitation::InvitationService;
pub use slug::generate_slug;
pub use studio::{NewStudio, StudioService};
