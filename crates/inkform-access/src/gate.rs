//! Per-request access decisions.
//!
//! The decision itself is a pure function over the path category and the
//! session state; [`AccessGate`] is the async wrapper that resolves the
//! caller's profile once per request.

use inkform_core::identity::Identity;
use inkform_core::models::profile::UserRole;
use inkform_core::repository::ProfileRepository;
use tracing::warn;

/// Redirect target for unauthenticated callers.
pub const LOGIN_PATH: &str = "/auth/login";
/// Redirect target for admins who still need to create their studio.
pub const STUDIO_CREATE_PATH: &str = "/studio/create";
/// Redirect target for members without a studio.
pub const WAITING_ROOM_PATH: &str = "/waiting-room";

/// Coarse classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCategory {
    /// Login, signup, and the rest of the auth section.
    Auth,
    /// Invitation acceptance pages. Reachable anonymously so an invitee
    /// can see what they were invited to before signing in.
    InvitationAccept,
    StudioCreate,
    WaitingRoom,
    /// The studio (tenant) section.
    Studio,
    Other,
}

impl PathCategory {
    pub fn of(path: &str) -> Self {
        // Most specific prefix first.
        if path.starts_with("/auth/invitation") {
            PathCategory::InvitationAccept
        } else if path.starts_with("/auth") {
            PathCategory::Auth
        } else if path.starts_with("/studio/create") {
            PathCategory::StudioCreate
        } else if path.starts_with("/waiting-room") {
            PathCategory::WaitingRoom
        } else if path.starts_with("/studio") {
            PathCategory::Studio
        } else {
            PathCategory::Other
        }
    }
}

/// What the gate knows about the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    /// Authenticated, but the profile is missing or could not be fetched.
    /// The gate fails open for this state: availability is preferred over
    /// strict enforcement, and the services re-check authorization anyway.
    ProfileUnavailable,
    Known { role: UserRole, has_studio: bool },
}

/// The gate's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(&'static str),
}

/// Decide whether a request may proceed.
pub fn decide(path: PathCategory, session: &SessionState) -> Decision {
    use PathCategory::*;

    match *session {
        SessionState::Anonymous => match path {
            Auth | InvitationAccept => Decision::Allow,
            _ => Decision::Redirect(LOGIN_PATH),
        },
        SessionState::ProfileUnavailable => Decision::Allow,
        SessionState::Known { role, has_studio } => match path {
            Auth | InvitationAccept => Decision::Allow,
            StudioCreate => match role {
                UserRole::StudioAdmin => Decision::Allow,
                UserRole::StudioMember => Decision::Redirect(WAITING_ROOM_PATH),
            },
            _ if has_studio => Decision::Allow,
            // No studio yet: admins are funnelled to creation, members
            // wait. The waiting room itself is only for members.
            WaitingRoom => match role {
                UserRole::StudioAdmin => Decision::Redirect(STUDIO_CREATE_PATH),
                UserRole::StudioMember => Decision::Allow,
            },
            Studio | Other => match role {
                UserRole::StudioAdmin => Decision::Redirect(STUDIO_CREATE_PATH),
                UserRole::StudioMember => Decision::Redirect(WAITING_ROOM_PATH),
            },
        },
    }
}

/// Async wrapper: resolves the caller's profile and delegates to
/// [`decide`].
pub struct AccessGate<P: ProfileRepository> {
    profiles: P,
}

impl<P: ProfileRepository> AccessGate<P> {
    pub fn new(profiles: P) -> Self {
        Self { profiles }
    }

    pub async fn evaluate(&self, identity: Option<&Identity>, path: &str) -> Decision {
        let state = match identity {
            None => SessionState::Anonymous,
            Some(identity) => match self.profiles.get(identity.id).await {
                Ok(Some(profile)) => SessionState::Known {
                    role: profile.role,
                    has_studio: profile.studio_id.is_some(),
                },
                Ok(None) => SessionState::ProfileUnavailable,
                Err(e) => {
                    warn!(user_id = %identity.id, error = %e, "profile fetch failed, failing open");
                    SessionState::ProfileUnavailable
                }
            },
        };
        decide(PathCategory::of(path), &state)
    }
}
