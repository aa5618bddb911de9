//! Studio lifecycle orchestration.

use inkform_core::error::InkformResult;
use inkform_core::models::profile::{ProfileStatus, UpdateUserProfile, UserProfile, UserRole};
use inkform_core::models::studio::{CreateStudio, Studio, UpdateStudio};
use inkform_core::repository::{ProfileRepository, StudioRepository};
use tracing::info;
use uuid::Uuid;

use crate::error::AccessError;
use crate::slug::generate_slug;

/// Input for studio creation. The slug and owner are derived, not taken
/// from the caller.
#[derive(Debug, Clone)]
pub struct NewStudio {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_province: Option<String>,
    pub address_postal_code: Option<String>,
    pub address_country: Option<String>,
    pub partita_iva: Option<String>,
    pub codice_fiscale: Option<String>,
    pub business_name: Option<String>,
    pub settings: Option<serde_json::Value>,
}

/// Studio service.
///
/// Generic over repository implementations so that this layer has no
/// dependency on the database crate.
pub struct StudioService<S: StudioRepository, P: ProfileRepository> {
    studios: S,
    profiles: P,
}

impl<S: StudioRepository, P: ProfileRepository> StudioService<S, P> {
    pub fn new(studios: S, profiles: P) -> Self {
        Self { studios, profiles }
    }

    /// Create a studio owned by `creator`.
    ///
    /// Only an active studio administrator who does not yet belong to a
    /// studio may create one. A name whose derived slug collides with an
    /// active studio is rejected; the caller retries with another name.
    pub async fn create_studio(&self, creator: Uuid, input: NewStudio) -> InkformResult<Studio> {
        let profile = self
            .profiles
            .get(creator)
            .await?
            .ok_or(AccessError::ProfileNotFound)?;
        if !profile.can_create_studio() {
            return Err(AccessError::CannotCreateStudio.into());
        }

        let slug = generate_slug(&input.name);
        if slug.is_empty() {
            return Err(AccessError::EmptySlug.into());
        }
        if self.studios.get_active_by_slug(&slug).await?.is_some() {
            return Err(AccessError::SlugTaken(slug).into());
        }

        let studio = self
            .studios
            .create(CreateStudio {
                name: input.name,
                slug,
                owner_id: creator,
                email: input.email,
                phone: input.phone,
                website: input.website,
                address_street: input.address_street,
                address_city: input.address_city,
                address_province: input.address_province,
                address_postal_code: input.address_postal_code,
                address_country: input.address_country,
                partita_iva: input.partita_iva,
                codice_fiscale: input.codice_fiscale,
                business_name: input.business_name,
                settings: input.settings,
            })
            .await?;

        // Bind the creator to their new studio.
        self.profiles
            .update(
                creator,
                UpdateUserProfile {
                    role: None,
                    studio_id: Some(studio.id),
                    status: None,
                    accepted_at: None,
                },
            )
            .await?;

        info!(studio_id = %studio.id, slug = %studio.slug, "studio created");
        Ok(studio)
    }

    /// Update studio details. Owner-only.
    ///
    /// A slug change is re-checked for uniqueness among active studios,
    /// excluding the studio itself.
    pub async fn update_studio(
        &self,
        actor: Uuid,
        studio_id: Uuid,
        input: UpdateStudio,
    ) -> InkformResult<Studio> {
        let studio = self.get_owned(actor, studio_id).await?;

        if let Some(slug) = &input.slug {
            if *slug != studio.slug {
                if slug.is_empty() {
                    return Err(AccessError::EmptySlug.into());
                }
                if let Some(other) = self.studios.get_active_by_slug(slug).await? {
                    if other.id != studio_id {
                        return Err(AccessError::SlugTaken(slug.clone()).into());
                    }
                }
            }
        }

        self.studios.update(studio_id, input).await
    }

    /// Soft-delete a studio and deactivate every member profile.
    /// Owner-only. The slug becomes available again.
    pub async fn delete_studio(&self, actor: Uuid, studio_id: Uuid) -> InkformResult<()> {
        self.get_owned(actor, studio_id).await?;

        self.studios.soft_delete(studio_id).await?;
        let deactivated = self.profiles.deactivate_by_studio(studio_id).await?;

        info!(studio_id = %studio_id, deactivated, "studio deleted");
        Ok(())
    }

    pub async fn get_studio(&self, id: Uuid) -> InkformResult<Option<Studio>> {
        self.studios.get_by_id(id).await
    }

    /// Whether a user may access a studio: the owner always may, otherwise
    /// an active profile bound to that studio is required.
    pub async fn can_access_studio(&self, studio_id: Uuid, user_id: Uuid) -> InkformResult<bool> {
        Ok(self.studio_role(studio_id, user_id).await?.is_some())
    }

    /// The role a user holds within a studio. The owner is reported as an
    /// administrator regardless of their profile.
    pub async fn studio_role(
        &self,
        studio_id: Uuid,
        user_id: Uuid,
    ) -> InkformResult<Option<UserRole>> {
        if let Some(studio) = self.studios.get_by_id(studio_id).await? {
            if studio.owner_id == user_id {
                return Ok(Some(UserRole::StudioAdmin));
            }
        }

        let profile = self.profiles.get(user_id).await?;
        Ok(profile
            .filter(|p| p.status == ProfileStatus::Active && p.studio_id == Some(studio_id))
            .map(|p| p.role))
    }

    /// Active members of a studio. Requires access to the studio.
    pub async fn list_members(
        &self,
        actor: Uuid,
        studio_id: Uuid,
    ) -> InkformResult<Vec<UserProfile>> {
        if !self.can_access_studio(studio_id, actor).await? {
            return Err(AccessError::NotAdmin.into());
        }
        self.profiles.list_active_by_studio(studio_id).await
    }

    /// Fetch the studio and require `actor` to be its owner.
    async fn get_owned(&self, actor: Uuid, studio_id: Uuid) -> InkformResult<Studio> {
        let studio = self
            .studios
            .get_by_id(studio_id)
            .await?
            .ok_or(AccessError::StudioNotFound)?;
        if studio.owner_id != actor {
            return Err(AccessError::NotOwner.into());
        }
        Ok(studio)
    }
}
