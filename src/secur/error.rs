//! Failure taxonomy for session decisions.
//!
//! Remote failures collapse into four kinds. `AccountNotFound` and
//! `InvalidSession` are authoritative and end the session; `Network` and
//! `Internal` are transient and leave an existing session in place.

use super::identity::RemoteFailure;
use super::storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Message some transports report instead of a typed connection failure.
const TRANSPORT_FAILURE_MESSAGE: &str = "Network Error";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SecurError {
    #[error("account not found")]
    AccountNotFound,
    #[error("invalid session (status {status})")]
    InvalidSession { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("missing '{0}' when initializing secur")]
    Config(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    AccountNotFound,
    InvalidSession,
    NetworkError,
    InternalError,
}

impl SecurError {
    /// Maps a raw identity-service failure to exactly one error kind.
    ///
    /// `404` is `AccountNotFound`, any other status is `InvalidSession`,
    /// transport failures are `Network`, everything else is `Internal` and is
    /// logged here.
    #[must_use]
    pub fn classify(failure: RemoteFailure) -> Self {
        match failure {
            RemoteFailure::Status { code: 404, .. } => Self::AccountNotFound,
            RemoteFailure::Status { code, .. } => Self::InvalidSession { status: code },
            RemoteFailure::Transport(message) => Self::Network(message),
            RemoteFailure::Unexpected(message)
                if message.eq_ignore_ascii_case(TRANSPORT_FAILURE_MESSAGE) =>
            {
                Self::Network(message)
            }
            RemoteFailure::Unexpected(message) => Self::internal(message),
        }
    }

    /// Builds an `Internal` error and logs it.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        error!("secur internal error: {message}");
        Self::Internal(message)
    }

    /// Kind used for redirect and handler policy. Configuration errors never
    /// reach a navigation cycle and count as internal.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound => ErrorKind::AccountNotFound,
            Self::InvalidSession { .. } => ErrorKind::InvalidSession,
            Self::Network(_) => ErrorKind::NetworkError,
            Self::Internal(_) | Self::Config(_) => ErrorKind::InternalError,
        }
    }

    /// Transient failures gate navigation but keep the session.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkError | ErrorKind::InternalError
        )
    }
}

impl From<StorageError> for SecurError {
    fn from(err: StorageError) -> Self {
        Self::internal(err.to_string())
    }
}
