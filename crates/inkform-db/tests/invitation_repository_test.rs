//! Integration tests for the invitation repository using in-memory
//! SurrealDB. Expiry is a read-time comparison, so these tests drive the
//! clock through the `now` parameter instead of sleeping.

use chrono::{Duration, Utc};
use inkform_core::models::invitation::{CreateStudioInvitation, InvitationStatus};
use inkform_core::models::profile::UserRole;
use inkform_core::repository::InvitationRepository;
use inkform_db::repository::SurrealInvitationRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    inkform_db::run_migrations(&db).await.unwrap();
    db
}

fn new_invitation(studio_id: Uuid, email: &str, token: &str) -> CreateStudioInvitation {
    CreateStudioInvitation {
        studio_id,
        invited_email: email.into(),
        invited_by: Uuid::new_v4(),
        role: UserRole::StudioMember,
        token: token.into(),
        message: None,
        expires_at: Utc::now() + Duration::days(7),
    }
}

#[tokio::test]
async fn create_and_find_by_token() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let studio_id = Uuid::new_v4();
    let created = repo
        .create(new_invitation(studio_id, "bob@example.com", "tok-1"))
        .await
        .unwrap();
    assert_eq!(created.status, InvitationStatus::Pending);
    assert_eq!(created.invited_email, "bob@example.com");

    let found = repo
        .get_pending_by_token("tok-1", Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.studio_id, studio_id);
}

#[tokio::test]
async fn expired_token_is_invisible() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    repo.create(new_invitation(Uuid::new_v4(), "bob@example.com", "tok-2"))
        .await
        .unwrap();

    // Visible now, invisible eight days from now. The row itself still
    // says pending; only the cleanup job persists 'expired'.
    let now = Utc::now();
    assert!(repo.get_pending_by_token("tok-2", now).await.unwrap().is_some());

    let later = now + Duration::days(8);
    assert!(repo.get_pending_by_token("tok-2", later).await.unwrap().is_none());
}

#[tokio::test]
async fn consumed_token_is_indistinguishable_from_missing() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let created = repo
        .create(new_invitation(Uuid::new_v4(), "bob@example.com", "tok-3"))
        .await
        .unwrap();

    repo.mark_accepted(created.id, Utc::now()).await.unwrap();

    assert!(
        repo.get_pending_by_token("tok-3", Utc::now())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.get_pending_by_token("no-such-token", Utc::now())
            .await
            .unwrap()
            .is_none()
    );

    let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);
    assert!(stored.accepted_at.is_some());
}

#[tokio::test]
async fn find_pending_matches_studio_and_email() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let studio_id = Uuid::new_v4();
    repo.create(new_invitation(studio_id, "bob@example.com", "tok-4"))
        .await
        .unwrap();

    let now = Utc::now();
    assert!(
        repo.find_pending(studio_id, "bob@example.com", now)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        repo.find_pending(studio_id, "carol@example.com", now)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.find_pending(Uuid::new_v4(), "bob@example.com", now)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn revert_to_pending_restores_the_token() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let created = repo
        .create(new_invitation(Uuid::new_v4(), "bob@example.com", "tok-5"))
        .await
        .unwrap();

    repo.mark_accepted(created.id, Utc::now()).await.unwrap();
    repo.revert_to_pending(created.id).await.unwrap();

    let restored = repo
        .get_pending_by_token("tok-5", Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored.id, created.id);
    assert_eq!(restored.status, InvitationStatus::Pending);
    assert!(restored.accepted_at.is_none());
}

#[tokio::test]
async fn refresh_issues_new_token_and_resets_status() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let created = repo
        .create(new_invitation(Uuid::new_v4(), "bob@example.com", "tok-6"))
        .await
        .unwrap();
    repo.mark_declined(created.id, Utc::now()).await.unwrap();

    let new_expiry = Utc::now() + Duration::days(7);
    let refreshed = repo
        .refresh(created.id, "tok-6-fresh".into(), new_expiry)
        .await
        .unwrap();
    assert_eq!(refreshed.status, InvitationStatus::Pending);
    assert_eq!(refreshed.token, "tok-6-fresh");
    assert!(refreshed.declined_at.is_none());

    // Old token is dead, new one works.
    assert!(
        repo.get_pending_by_token("tok-6", Utc::now())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.get_pending_by_token("tok-6-fresh", Utc::now())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn mark_expired_by_email_persists_status() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let studio_a = Uuid::new_v4();
    let studio_b = Uuid::new_v4();
    repo.create(new_invitation(studio_a, "stale@example.com", "tok-7a"))
        .await
        .unwrap();
    repo.create(new_invitation(studio_b, "stale@example.com", "tok-7b"))
        .await
        .unwrap();
    repo.create(new_invitation(studio_a, "other@example.com", "tok-7c"))
        .await
        .unwrap();

    let touched = repo.mark_expired_by_email("stale@example.com").await.unwrap();
    assert_eq!(touched, 2);

    let remaining = repo
        .list_pending_by_email("stale@example.com", Utc::now())
        .await
        .unwrap();
    assert!(remaining.is_empty());

    let untouched = repo
        .list_pending_by_email("other@example.com", Utc::now())
        .await
        .unwrap();
    assert_eq!(untouched.len(), 1);
}

#[tokio::test]
async fn list_by_studio_includes_all_statuses() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let studio_id = Uuid::new_v4();
    let first = repo
        .create(new_invitation(studio_id, "a@example.com", "tok-8a"))
        .await
        .unwrap();
    repo.create(new_invitation(studio_id, "b@example.com", "tok-8b"))
        .await
        .unwrap();
    repo.mark_declined(first.id, Utc::now()).await.unwrap();

    let all = repo.list_by_studio(studio_id).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn delete_removes_the_invitation() {
    let db = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let created = repo
        .create(new_invitation(Uuid::new_v4(), "bob@example.com", "tok-9"))
        .await
        .unwrap();

    repo.delete(created.id).await.unwrap();
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
}
