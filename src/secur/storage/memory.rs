use super::{cookie_expiry, CookieJar, LocalCache, SessionMedium, StorageError};
use cookie::Cookie;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Default)]
struct Inner {
    cookies: HashMap<String, StoredCookie>,
    local: HashMap<String, String>,
    clock_offset: Duration,
}

impl Inner {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc() + self.clock_offset
    }
}

/// Process-local storage implementing both mediums.
///
/// The clock can be moved forward with [`MemoryStorage::advance`] so cookie
/// expirations can be observed without waiting.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves this storage's clock forward.
    pub fn advance(&self, by: Duration) {
        let mut inner = self.lock();
        inner.clock_offset += by;
    }

    /// Number of live cookies.
    #[must_use]
    pub fn cookie_count(&self) -> usize {
        let inner = self.lock();
        let now = inner.now();
        inner
            .cookies
            .values()
            .filter(|c| c.expires_at.map_or(true, |at| at > now))
            .count()
    }

    #[must_use]
    pub fn local_len(&self) -> usize {
        self.lock().local.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every write leaves the maps consistent, so a poisoned lock is usable.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CookieJar for MemoryStorage {
    fn get(&self, name: &str) -> Option<String> {
        let inner = self.lock();
        let now = inner.now();
        inner
            .cookies
            .get(name)
            .filter(|c| c.expires_at.map_or(true, |at| at > now))
            .map(|c| c.value.clone())
    }

    fn set(&self, cookie: Cookie<'static>) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let now = inner.now();
        let expires_at = cookie_expiry(&cookie, now);
        if expires_at.is_some_and(|at| at <= now) {
            inner.cookies.remove(cookie.name());
        } else {
            inner.cookies.insert(
                cookie.name().to_string(),
                StoredCookie {
                    value: cookie.value().to_string(),
                    expires_at,
                },
            );
        }
        Ok(())
    }
}

impl LocalCache for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().local.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().local.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock().local.clear();
        Ok(())
    }
}

impl SessionMedium for MemoryStorage {
    fn clear_session(&self, cookies: &[String]) -> Result<(), StorageError> {
        let mut inner = self.lock();
        for name in cookies {
            inner.cookies.remove(name);
        }
        inner.local.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_with_max_age_expires_when_clock_advances() -> Result<(), StorageError> {
        let storage = MemoryStorage::new();
        storage.set(
            Cookie::build(("marker", "x"))
                .max_age(Duration::hours(1))
                .build(),
        )?;
        assert_eq!(storage.get("marker").as_deref(), Some("x"));

        storage.advance(Duration::minutes(59));
        assert!(storage.exists("marker"));

        storage.advance(Duration::minutes(2));
        assert!(!storage.exists("marker"));
        assert_eq!(storage.cookie_count(), 0);
        Ok(())
    }

    #[test]
    fn remove_drops_cookie() -> Result<(), StorageError> {
        let storage = MemoryStorage::new();
        storage.set(Cookie::new("token", "abc"))?;
        storage.remove("token")?;
        assert_eq!(storage.get("token"), None);
        Ok(())
    }

    #[test]
    fn local_clear_wipes_all_keys() -> Result<(), StorageError> {
        let storage = MemoryStorage::new();
        storage.set_item("a", "1")?;
        storage.set_item("b", "2")?;
        storage.clear()?;
        assert_eq!(storage.local_len(), 0);
        assert_eq!(storage.get_item("a"), None);
        Ok(())
    }
}
