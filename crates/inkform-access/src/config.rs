//! Invitation configuration.

/// Configuration for the invitation lifecycle.
#[derive(Debug, Clone)]
pub struct InvitationConfig {
    /// Invitation lifetime in days (default: 7).
    pub ttl_days: i64,
    /// Age in days after which an unanswered invitation is eligible for
    /// cleanup (default: 7).
    pub cleanup_threshold_days: i64,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            ttl_days: 7,
            cleanup_threshold_days: 7,
        }
    }
}
