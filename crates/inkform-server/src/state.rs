//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::Client;

use inkform_access::{AccessGate, InvitationService, StudioService};
use inkform_db::directory::SurrealIdentityDirectory;
use inkform_db::repository::{
    SurrealArchivedPdfRepository, SurrealFormRepository, SurrealInvitationRepository,
    SurrealProfileRepository, SurrealStudioRepository, SurrealTemplateRepository,
};

pub type Studios = StudioService<SurrealStudioRepository<Client>, SurrealProfileRepository<Client>>;
pub type Invitations = InvitationService<
    SurrealStudioRepository<Client>,
    SurrealProfileRepository<Client>,
    SurrealInvitationRepository<Client>,
    SurrealIdentityDirectory<Client>,
>;
/// State shared by every request: repositories, the domain services built
/// over them, and the access gate.
pub struct AppState {
    pub profiles: SurrealProfileRepository<Client>,
    pub templates: SurrealTemplateRepository<Client>,
    pub forms: SurrealFormRepository<Client>,
    pub archive: SurrealArchivedPdfRepository<Client>,
    pub studios: Studios,
    pub invitations: Invitations,
    pub directory: SurrealIdentityDirectory<Client>,
    pub gate: AccessGate<SurrealProfileRepository<Client>>,
}

impl AppState {
    pub fn new(db: Surreal<Client>) -> Arc<Self> {
        let profiles = SurrealProfileRepository::new(db.clone());
        let directory = SurrealIdentityDirectory::new(db.clone());

        let studios = StudioService::new(
            SurrealStudioRepository::new(db.clone()),
            SurrealProfileRepository::new(db.clone()),
        );
        let invitations = InvitationService::new(
            SurrealStudioRepository::new(db.clone()),
            SurrealProfileRepository::new(db.clone()),
            SurrealInvitationRepository::new(db.clone()),
            SurrealIdentityDirectory::new(db.clone()),
        );

        Arc::new(Self {
            templates: SurrealTemplateRepository::new(db.clone()),
            forms: SurrealFormRepository::new(db.clone()),
            archive: SurrealArchivedPdfRepository::new(db.clone()),
            gate: AccessGate::new(SurrealProfileRepository::new(db.clone())),
            studios,
            invitations,
            directory,
            profiles,
        })
    }
}
