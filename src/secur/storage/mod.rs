//! Persistence capabilities consumed by the session store.
//!
//! Two mediums are modelled separately: a cookie area for short-lived markers
//! with expirations, and a local cache for longer-lived serialized data. A
//! backend may implement both on the same object. Missing entries are `None`,
//! never an error; only writes can fail.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use cookie::Cookie;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cookie area with per-entry expiration.
pub trait CookieJar: Send + Sync {
    /// Returns the value of a live cookie, `None` when missing or expired.
    fn get(&self, name: &str) -> Option<String>;

    /// Writes a cookie. A cookie whose expiry is already in the past removes
    /// any existing entry with that name.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the change.
    fn set(&self, cookie: Cookie<'static>) -> Result<(), StorageError>;

    /// Removes a cookie by expiring it.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the change.
    fn remove(&self, name: &str) -> Result<(), StorageError> {
        self.set(
            Cookie::build((name.to_string(), String::new()))
                .path("/")
                .expires(OffsetDateTime::UNIX_EPOCH)
                .build(),
        )
    }

    fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Key-value cache that survives navigations.
pub trait LocalCache: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the backend cannot persist the change.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Wipes every key, not only the ones this crate writes.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the change.
    fn clear(&self) -> Result<(), StorageError>;
}

/// A backend holding both mediums that can end a session in one write.
pub trait SessionMedium: CookieJar + LocalCache {
    /// Removes the named cookies and wipes the local cache as a single
    /// change: either all of it is applied or none of it is.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the change; the stored
    /// session is left as it was.
    fn clear_session(&self, cookies: &[String]) -> Result<(), StorageError>;
}

/// Absolute expiry of a cookie relative to `now`.
///
/// `Max-Age` wins over `Expires`, as in browsers. `None` means a session
/// cookie that never expires on its own.
pub(crate) fn cookie_expiry(cookie: &Cookie<'_>, now: OffsetDateTime) -> Option<OffsetDateTime> {
    if let Some(max_age) = cookie.max_age() {
        return Some(now + max_age.max(Duration::ZERO));
    }
    cookie.expires_datetime()
}
