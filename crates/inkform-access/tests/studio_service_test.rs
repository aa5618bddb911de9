//! Integration tests for the studio service using in-memory SurrealDB.

use inkform_access::studio::{NewStudio, StudioService};
use inkform_core::error::InkformError;
use inkform_core::models::profile::{CreateUserProfile, ProfileStatus, UserRole};
use inkform_core::models::studio::UpdateStudio;
use inkform_core::repository::ProfileRepository;
use inkform_db::repository::{SurrealProfileRepository, SurrealStudioRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

async fn setup() -> (
    StudioService<SurrealStudioRepository<Db>, SurrealProfileRepository<Db>>,
    SurrealProfileRepository<Db>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    inkform_db::run_migrations(&db).await.unwrap();

    let profiles = SurrealProfileRepository::new(db.clone());
    let studios = SurrealStudioRepository::new(db);
    (StudioService::new(studios, profiles.clone()), profiles)
}

async fn seed_profile(
    profiles: &SurrealProfileRepository<Db>,
    role: UserRole,
    studio_id: Option<Uuid>,
    status: ProfileStatus,
) -> Uuid {
    let user_id = Uuid::new_v4();
    profiles
        .create(CreateUserProfile {
            user_id,
            role,
            studio_id,
            status,
            invited_by: None,
            invited_at: None,
            accepted_at: None,
        })
        .await
        .unwrap();
    user_id
}

fn new_studio(name: &str) -> NewStudio {
    NewStudio {
        name: name.into(),
        email: Some("studio@example.com".into()),
        phone: None,
        website: None,
        address_street: None,
        address_city: None,
        address_province: None,
        address_postal_code: None,
        address_country: Some("IT".into()),
        partita_iva: None,
        codice_fiscale: None,
        business_name: None,
        settings: None,
    }
}

#[tokio::test]
async fn active_admin_without_studio_creates_one() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;

    let studio = service
        .create_studio(alice, new_studio("Alice's Ink Studio"))
        .await
        .unwrap();
    assert_eq!(studio.owner_id, alice);
    assert_eq!(studio.slug, "alices-ink-studio");

    // The creator's profile is now bound to the studio.
    let profile = profiles.get(alice).await.unwrap().unwrap();
    assert_eq!(profile.studio_id, Some(studio.id));
}

#[tokio::test]
async fn member_cannot_create_a_studio() {
    let (service, profiles) = setup().await;
    let member =
        seed_profile(&profiles, UserRole::StudioMember, None, ProfileStatus::Active).await;

    let err = service
        .create_studio(member, new_studio("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn pending_admin_cannot_create_a_studio() {
    let (service, profiles) = setup().await;
    let pending =
        seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Pending).await;

    let err = service
        .create_studio(pending, new_studio("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn admin_already_in_a_studio_cannot_create_another() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    service
        .create_studio(alice, new_studio("First Studio"))
        .await
        .unwrap();

    let err = service
        .create_studio(alice, new_studio("Second Studio"))
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn user_without_profile_cannot_create_a_studio() {
    let (service, _) = setup().await;

    let err = service
        .create_studio(Uuid::new_v4(), new_studio("Ghost Studio"))
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::NotFound { .. }));
}

#[tokio::test]
async fn colliding_slug_is_rejected() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let bob = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;

    service
        .create_studio(alice, new_studio("Black Lotus"))
        .await
        .unwrap();

    // "black lotus" normalizes to the same slug.
    let err = service
        .create_studio(bob, new_studio("black lotus"))
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::Conflict { .. }));
}

#[tokio::test]
async fn unsluggable_name_is_rejected() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;

    let err = service
        .create_studio(alice, new_studio("!!!"))
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::Validation { .. }));
}

#[tokio::test]
async fn delete_frees_the_slug_and_deactivates_members() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let studio = service
        .create_studio(alice, new_studio("Black Lotus"))
        .await
        .unwrap();

    // A member joined along the way.
    let member = seed_profile(
        &profiles,
        UserRole::StudioMember,
        Some(studio.id),
        ProfileStatus::Active,
    )
    .await;

    service.delete_studio(alice, studio.id).await.unwrap();

    let member_profile = profiles.get(member).await.unwrap().unwrap();
    assert_eq!(member_profile.status, ProfileStatus::Inactive);

    // The slug is available to someone else now.
    let carol = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let replacement = service
        .create_studio(carol, new_studio("Black Lotus"))
        .await
        .unwrap();
    assert_eq!(replacement.slug, "black-lotus");
}

#[tokio::test]
async fn only_the_owner_deletes_or_updates() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let studio = service
        .create_studio(alice, new_studio("Black Lotus"))
        .await
        .unwrap();

    // An admin member is still not the owner.
    let admin = seed_profile(
        &profiles,
        UserRole::StudioAdmin,
        Some(studio.id),
        ProfileStatus::Active,
    )
    .await;

    let err = service.delete_studio(admin, studio.id).await.unwrap_err();
    assert!(matches!(err, InkformError::AuthorizationDenied { .. }));

    let update = UpdateStudio {
        name: Some("Renamed".into()),
        ..Default::default()
    };
    let err = service
        .update_studio(admin, studio.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::AuthorizationDenied { .. }));

    let updated = service.update_studio(alice, studio.id, update).await.unwrap();
    assert_eq!(updated.name, "Renamed");
}

#[tokio::test]
async fn slug_change_rechecks_uniqueness_excluding_self() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let bob = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let first = service
        .create_studio(alice, new_studio("First"))
        .await
        .unwrap();
    service.create_studio(bob, new_studio("Second")).await.unwrap();

    let mut update = UpdateStudio {
        slug: Some("second".into()),
        ..Default::default()
    };
    let err = service
        .update_studio(alice, first.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, InkformError::Conflict { .. }));

    // Re-submitting the current slug is fine.
    update.slug = Some("first".into());
    service.update_studio(alice, first.id, update).await.unwrap();
}

#[tokio::test]
async fn owner_is_reported_as_admin_without_a_matching_profile() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let studio = service
        .create_studio(alice, new_studio("Black Lotus"))
        .await
        .unwrap();

    let role = service.studio_role(studio.id, alice).await.unwrap();
    assert_eq!(role, Some(UserRole::StudioAdmin));
    assert!(service.can_access_studio(studio.id, alice).await.unwrap());

    // An unrelated user has no role and no access.
    let stranger = Uuid::new_v4();
    assert_eq!(service.studio_role(studio.id, stranger).await.unwrap(), None);
    assert!(!service.can_access_studio(studio.id, stranger).await.unwrap());
}

#[tokio::test]
async fn member_listing_requires_access() {
    let (service, profiles) = setup().await;
    let alice = seed_profile(&profiles, UserRole::StudioAdmin, None, ProfileStatus::Active).await;
    let studio = service
        .create_studio(alice, new_studio("Black Lotus"))
        .await
        .unwrap();
    seed_profile(
        &profiles,
        UserRole::StudioMember,
        Some(studio.id),
        ProfileStatus::Active,
    )
    .await;

    let members = service.list_members(alice, studio.id).await.unwrap();
    assert_eq!(members.len(), 2);

    let stranger = Uuid::new_v4();
    assert!(service.list_members(stranger, studio.id).await.is_err());
}
