//! Integration tests for profile and studio repositories using in-memory
//! SurrealDB.

use chrono::{Duration, Utc};
use inkform_core::models::profile::{
    CreateUserProfile, ProfileStatus, UpdateUserProfile, UserRole,
};
use inkform_core::models::studio::{CreateStudio, UpdateStudio};
use inkform_core::repository::{ProfileRepository, StudioRepository};
use inkform_db::repository::{SurrealProfileRepository, SurrealStudioRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    inkform_db::run_migrations(&db).await.unwrap();
    db
}

fn new_profile(user_id: Uuid, role: UserRole, status: ProfileStatus) -> CreateUserProfile {
    CreateUserProfile {
        user_id,
        role,
        studio_id: None,
        status,
        invited_by: None,
        invited_at: None,
        accepted_at: None,
    }
}

fn new_studio(owner_id: Uuid, slug: &str) -> CreateStudio {
    CreateStudio {
        name: "Ink Studio".into(),
        slug: slug.into(),
        owner_id,
        email: Some("studio@example.com".into()),
        phone: None,
        website: None,
        address_street: Some("Via Roma 1".into()),
        address_city: Some("Milano".into()),
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
async fn create_and_get_profile() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let user_id = Uuid::new_v4();
    let created = repo
        .create(new_profile(
            user_id,
            UserRole::StudioAdmin,
            ProfileStatus::Active,
        ))
        .await
        .unwrap();
    assert_eq!(created.user_id, user_id);
    assert_eq!(created.role, UserRole::StudioAdmin);
    assert_eq!(created.status, ProfileStatus::Active);
    assert!(created.studio_id.is_none());

    let fetched = repo.get(user_id).await.unwrap().unwrap();
    assert_eq!(fetched.user_id, user_id);
    assert_eq!(fetched.role, UserRole::StudioAdmin);
}

#[tokio::test]
async fn get_missing_profile_is_none() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let fetched = repo.get(Uuid::new_v4()).await.unwrap();
    assert!(fetched.is_none());
}

#[tokio::test]
async fn duplicate_profile_create_fails() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let user_id = Uuid::new_v4();
    repo.create(new_profile(
        user_id,
        UserRole::StudioMember,
        ProfileStatus::Active,
    ))
    .await
    .unwrap();

    let second = repo
        .create(new_profile(
            user_id,
            UserRole::StudioMember,
            ProfileStatus::Active,
        ))
        .await;
    assert!(second.is_err());
}

#[tokio::test]
async fn partial_update_is_last_write_wins() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let user_id = Uuid::new_v4();
    repo.create(new_profile(
        user_id,
        UserRole::StudioMember,
        ProfileStatus::Pending,
    ))
    .await
    .unwrap();

    let studio_id = Uuid::new_v4();
    let accepted_at = Utc::now();
    let updated = repo
        .update(
            user_id,
            UpdateUserProfile {
                role: None,
                studio_id: Some(studio_id),
                status: Some(ProfileStatus::Active),
                accepted_at: Some(accepted_at),
            },
        )
        .await
        .unwrap();

    // Untouched fields survive a partial update.
    assert_eq!(updated.role, UserRole::StudioMember);
    assert_eq!(updated.studio_id, Some(studio_id));
    assert_eq!(updated.status, ProfileStatus::Active);
    assert!(updated.accepted_at.is_some());
}

#[tokio::test]
async fn overlapping_updates_resolve_last_write_wins() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let user_id = Uuid::new_v4();
    repo.create(new_profile(
        user_id,
        UserRole::StudioMember,
        ProfileStatus::Pending,
    ))
    .await
    .unwrap();

    let studio_id = Uuid::new_v4();
    let set_status = repo.update(
        user_id,
        UpdateUserProfile {
            role: None,
            studio_id: None,
            status: Some(ProfileStatus::Active),
            accepted_at: None,
        },
    );
    let set_studio = repo.update(
        user_id,
        UpdateUserProfile {
            role: None,
            studio_id: Some(studio_id),
            status: None,
            accepted_at: None,
        },
    );
    let (a, b) = tokio::join!(set_status, set_studio);
    a.unwrap();
    b.unwrap();

    // No optimistic locking: each write only touches its own fields, so
    // whatever the interleaving, both land and neither is lost.
    let final_state = repo.get(user_id).await.unwrap().unwrap();
    assert_eq!(final_state.status, ProfileStatus::Active);
    assert_eq!(final_state.studio_id, Some(studio_id));
}

#[tokio::test]
async fn deactivate_by_studio_touches_only_that_studio() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let studio_a = Uuid::new_v4();
    let studio_b = Uuid::new_v4();

    for _ in 0..3 {
        let user_id = Uuid::new_v4();
        let mut input = new_profile(user_id, UserRole::StudioMember, ProfileStatus::Active);
        input.studio_id = Some(studio_a);
        repo.create(input).await.unwrap();
    }
    let other_user = Uuid::new_v4();
    let mut other = new_profile(other_user, UserRole::StudioAdmin, ProfileStatus::Active);
    other.studio_id = Some(studio_b);
    repo.create(other).await.unwrap();

    let touched = repo.deactivate_by_studio(studio_a).await.unwrap();
    assert_eq!(touched, 3);

    assert!(repo.list_active_by_studio(studio_a).await.unwrap().is_empty());
    assert_eq!(repo.list_active_by_studio(studio_b).await.unwrap().len(), 1);

    // Re-running is a no-op.
    let touched_again = repo.deactivate_by_studio(studio_a).await.unwrap();
    assert_eq!(touched_again, 0);
}

#[tokio::test]
async fn list_pending_invited_before_cutoff() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let stale_user = Uuid::new_v4();
    let mut stale = new_profile(stale_user, UserRole::StudioMember, ProfileStatus::Pending);
    stale.invited_at = Some(Utc::now() - Duration::days(10));
    repo.create(stale).await.unwrap();

    let fresh_user = Uuid::new_v4();
    let mut fresh = new_profile(fresh_user, UserRole::StudioMember, ProfileStatus::Pending);
    fresh.invited_at = Some(Utc::now() - Duration::days(1));
    repo.create(fresh).await.unwrap();

    let cutoff = Utc::now() - Duration::days(7);
    let stale_profiles = repo.list_pending_invited_before(cutoff).await.unwrap();
    assert_eq!(stale_profiles.len(), 1);
    assert_eq!(stale_profiles[0].user_id, stale_user);
}

#[tokio::test]
async fn create_and_get_studio() {
    let db = setup().await;
    let repo = SurrealStudioRepository::new(db);

    let owner_id = Uuid::new_v4();
    let studio = repo.create(new_studio(owner_id, "ink-studio")).await.unwrap();
    assert_eq!(studio.slug, "ink-studio");
    assert_eq!(studio.owner_id, owner_id);
    assert!(studio.is_active);

    let fetched = repo.get_by_id(studio.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, studio.id);
    assert_eq!(fetched.address_city.as_deref(), Some("Milano"));
}

#[tokio::test]
async fn slug_lookup_skips_soft_deleted_studios() {
    let db = setup().await;
    let repo = SurrealStudioRepository::new(db);

    let studio = repo
        .create(new_studio(Uuid::new_v4(), "black-lotus"))
        .await
        .unwrap();

    assert!(
        repo.get_active_by_slug("black-lotus")
            .await
            .unwrap()
            .is_some()
    );

    repo.soft_delete(studio.id).await.unwrap();

    // The slug is free again and the record still exists.
    assert!(
        repo.get_active_by_slug("black-lotus")
            .await
            .unwrap()
            .is_none()
    );
    let deleted = repo.get_by_id(studio.id).await.unwrap().unwrap();
    assert!(!deleted.is_active);
}

#[tokio::test]
async fn owner_lookup_finds_only_active_studio() {
    let db = setup().await;
    let repo = SurrealStudioRepository::new(db);

    let owner_id = Uuid::new_v4();
    let first = repo.create(new_studio(owner_id, "first")).await.unwrap();
    repo.soft_delete(first.id).await.unwrap();

    assert!(repo.get_active_by_owner(owner_id).await.unwrap().is_none());

    let second = repo.create(new_studio(owner_id, "second")).await.unwrap();
    let found = repo.get_active_by_owner(owner_id).await.unwrap().unwrap();
    assert_eq!(found.id, second.id);
}

#[tokio::test]
async fn studio_partial_update() {
    let db = setup().await;
    let repo = SurrealStudioRepository::new(db);

    let studio = repo
        .create(new_studio(Uuid::new_v4(), "old-slug"))
        .await
        .unwrap();

    let updated = repo
        .update(
            studio.id,
            UpdateStudio {
                name: Some("Renamed Studio".into()),
                slug: None,
                email: None,
                phone: Some("+39 02 1234567".into()),
                website: None,
                address_street: None,
                address_city: None,
                address_province: None,
                address_postal_code: None,
                address_country: None,
                partita_iva: None,
                codice_fiscale: None,
                business_name: None,
                settings: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed Studio");
    assert_eq!(updated.slug, "old-slug");
    assert_eq!(updated.phone.as_deref(), Some("+39 02 1234567"));
}
