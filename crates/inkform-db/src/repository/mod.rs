//! SurrealDB repository implementations.

mod archived_pdf;
mod form;
mod invitation;
mod profile;
mod studio;
mod template;

pub use archived_pdf::SurrealArchivedPdfRepository;
pub use form::SurrealFormRepository;
pub use invitation::SurrealInvitationRepository;
pub use profile::SurrealProfileRepository;
pub use studio::SurrealStudioRepository;
pub use template::SurrealTemplateRepository;
