//! Integration tests for the abandoned-invitation cleanup job.

use chrono::{Duration, Utc};
use inkform_access::cleanup::CleanupService;
use inkform_access::config::InvitationConfig;
use inkform_core::identity::IdentityProvider;
use inkform_core::models::invitation::{CreateStudioInvitation, InvitationStatus};
use inkform_core::models::profile::{CreateUserProfile, ProfileStatus, UserRole};
use inkform_core::repository::{InvitationRepository, ProfileRepository};
use inkform_db::directory::SurrealIdentityDirectory;
use inkform_db::repository::{SurrealInvitationRepository, SurrealProfileRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

struct Harness {
    cleanup: CleanupService<
        SurrealProfileRepository<Db>,
        SurrealInvitationRepository<Db>,
        SurrealIdentityDirectory<Db>,
    >,
    profiles: SurrealProfileRepository<Db>,
    invitations: SurrealInvitationRepository<Db>,
    directory: SurrealIdentityDirectory<Db>,
}

async fn setup() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    inkform_db::run_migrations(&db).await.unwrap();

    let profiles = SurrealProfileRepository::new(db.clone());
    let invitations = SurrealInvitationRepository::new(db.clone());
    let directory = SurrealIdentityDirectory::new(db);

    let cleanup = CleanupService::with_config(
        profiles.clone(),
        invitations.clone(),
        directory.clone(),
        InvitationConfig::default(),
    );

    Harness {
        cleanup,
        profiles,
        invitations,
        directory,
    }
}

/// Provision an invitee the way the invitation service does, with the
/// invitation timestamp pushed `age_days` into the past.
async fn seed_invitee(h: &Harness, email: &str, age_days: i64) -> (Uuid, Uuid) {
    let studio_id = Uuid::new_v4();
    let invited_at = Utc::now() - Duration::days(age_days);

    let identity = h.directory.invite(email).await.unwrap();
    h.profiles
        .create(CreateUserProfile {
            user_id: identity.id,
            role: UserRole::StudioMember,
            studio_id: Some(studio_id),
            status: ProfileStatus::Pending,
            invited_by: Some(Uuid::new_v4()),
            invited_at: Some(invited_at),
            accepted_at: None,
        })
        .await
        .unwrap();
    let invitation = h
        .invitations
        .create(CreateStudioInvitation {
            studio_id,
            invited_email: email.into(),
            invited_by: Uuid::new_v4(),
            role: UserRole::StudioMember,
            token: format!("token-{email}"),
            message: None,
            expires_at: invited_at + Duration::days(7),
        })
        .await
        .unwrap();

    (identity.id, invitation.id)
}

#[tokio::test]
async fn stale_invitees_are_reaped() {
    let h = setup().await;
    let (stale_user, _) = seed_invitee(&h, "stale@example.com", 10).await;

    let report = h.cleanup.cleanup().await.unwrap();
    assert_eq!(report.deleted_profiles, 1);
    assert_eq!(report.deleted_identities, 1);
    assert_eq!(report.expired_invitations, 1);
    assert!(report.errors.is_empty());

    // Profile and identity are gone; the invitation keeps a persisted
    // 'expired' status for the audit trail.
    assert!(h.profiles.get(stale_user).await.unwrap().is_none());
    assert!(h.directory.get_by_id(stale_user).await.unwrap().is_none());

    let listed = h
        .invitations
        .list_pending_by_email("stale@example.com", Utc::now() - Duration::days(9))
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn fresh_invitees_are_left_alone() {
    let h = setup().await;
    let (fresh_user, _) = seed_invitee(&h, "fresh@example.com", 2).await;

    let report = h.cleanup.cleanup().await.unwrap();
    assert_eq!(report.deleted_profiles, 0);
    assert_eq!(report.deleted_identities, 0);

    assert!(h.profiles.get(fresh_user).await.unwrap().is_some());
    assert!(h.directory.get_by_id(fresh_user).await.unwrap().is_some());
}

#[tokio::test]
async fn mixed_run_reaps_only_the_stale() {
    let h = setup().await;
    let (stale_user, _) = seed_invitee(&h, "stale@example.com", 30).await;
    let (fresh_user, _) = seed_invitee(&h, "fresh@example.com", 1).await;

    let report = h.cleanup.cleanup().await.unwrap();
    assert_eq!(report.deleted_profiles, 1);
    assert!(h.profiles.get(stale_user).await.unwrap().is_none());
    assert!(h.profiles.get(fresh_user).await.unwrap().is_some());
}

#[tokio::test]
async fn missing_identity_does_not_stop_the_run() {
    let h = setup().await;
    let (stale_user, _) = seed_invitee(&h, "stale@example.com", 10).await;

    // The identity vanished out from under us (manual deletion, provider
    // drift). The profile must still be reaped.
    h.directory.delete(stale_user).await.unwrap();

    let report = h.cleanup.cleanup().await.unwrap();
    assert_eq!(report.deleted_profiles, 1);
    assert_eq!(report.expired_invitations, 0);
    assert!(h.profiles.get(stale_user).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_status_is_persisted_on_the_invitation() {
    let h = setup().await;
    let (_, invitation_id) = seed_invitee(&h, "stale@example.com", 10).await;

    h.cleanup.cleanup().await.unwrap();

    let stored = h
        .invitations
        .get_by_id(invitation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvitationStatus::Expired);
}
