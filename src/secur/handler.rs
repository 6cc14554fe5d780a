use super::error::SecurError;

/// Optional user-facing hooks for failed session decisions.
///
/// Every hook defaults to doing nothing, so implementors override only the
/// ones they need. The specific hooks fire only when a session existed before
/// the failing navigation.
pub trait ErrorHandler: Send + Sync {
    /// The identity service no longer knows the account.
    fn handle_account_not_found(&self, _error: &SecurError) {}

    /// The credential was rejected for any other reason.
    fn handle_session_expired(&self, _error: &SecurError) {}

    /// Network or internal failure; the session is kept.
    fn handle_error(&self, _error: &SecurError) {}
}
