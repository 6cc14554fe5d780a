//! Persistent session store over the cookie area and the local cache.
//!
//! Layout:
//! - `session::token` cookie: the credential, 7 days, path `/`.
//! - `session::verify` cookie: random marker, 1 hour, path `/`. Its presence
//!   means the cached member is fresh; its value is never read.
//! - `account_data` cache key: the last known member as JSON.

use super::config::StoreConfig;
use super::member::{CachedMember, Member};
use super::storage::{CookieJar, LocalCache, SessionMedium, StorageError};
use cookie::Cookie;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionStore {
    cookies: Arc<dyn CookieJar>,
    local: Arc<dyn LocalCache>,
    // Set when both mediums live in one backend, so `clear` is one write.
    medium: Option<Arc<dyn SessionMedium>>,
    config: StoreConfig,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(
        cookies: Arc<dyn CookieJar>,
        local: Arc<dyn LocalCache>,
        config: StoreConfig,
    ) -> Self {
        Self {
            cookies,
            local,
            medium: None,
            config,
        }
    }

    /// Store over a backend that provides both mediums.
    #[must_use]
    pub fn with_backend<B>(backend: Arc<B>, config: StoreConfig) -> Self
    where
        B: SessionMedium + 'static,
    {
        Self::new(backend.clone(), backend.clone(), config).with_medium(backend)
    }

    /// `medium` must be the backend behind both the cookie area and the
    /// local cache of this store.
    #[must_use]
    pub(crate) fn with_medium(mut self, medium: Arc<dyn SessionMedium>) -> Self {
        self.medium = Some(medium);
        self
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn cookie(&self, name: String, value: String, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path(self.config.cookie_path().to_string())
            .max_age(max_age)
            .secure(self.config.cookie_secure());
        if let Some(domain) = self.config.cookie_domain() {
            builder = builder.domain(domain.to_string());
        }
        if let Some(same_site) = self.config.same_site() {
            builder = builder.same_site(same_site);
        }
        builder.build()
    }

    /// Stored credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<SecretString> {
        self.cookies
            .get(&self.config.token_cookie())
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
    }

    /// Stores the credential with the configured lifetime.
    ///
    /// # Errors
    /// Returns an error if the cookie area cannot be written.
    pub fn set_credential(&self, token: &SecretString) -> Result<(), StorageError> {
        self.set_credential_with_ttl(token, self.config.credential_ttl())
    }

    /// # Errors
    /// Returns an error if the cookie area cannot be written.
    pub fn set_credential_with_ttl(
        &self,
        token: &SecretString,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        let cookie = self.cookie(
            self.config.token_cookie(),
            token.expose_secret().to_string(),
            ttl,
        );
        self.cookies.set(cookie)
    }

    /// Wipes the local cache and removes both cookies.
    ///
    /// A single backend applies all of it in one write. Over separate
    /// mediums the marker goes first, then the credential, then the cache,
    /// so a failure part way leaves at worst a stale session that the next
    /// navigation re-verifies, never a fresh marker without its member.
    ///
    /// Calling it on an empty store is a no-op.
    ///
    /// # Errors
    /// Returns an error if either medium cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        let cookies = [self.config.verify_cookie(), self.config.token_cookie()];
        match &self.medium {
            Some(medium) => medium.clear_session(&cookies)?,
            None => {
                for name in &cookies {
                    self.cookies.remove(name)?;
                }
                self.local.clear()?;
            }
        }
        debug!("session store cleared");
        Ok(())
    }

    /// Persists the member and restarts the freshness window with a new
    /// random marker.
    ///
    /// # Errors
    /// Returns an error if the member cannot be serialized or either medium
    /// cannot be written.
    pub fn cache_member(&self, member: &Member) -> Result<(), StorageError> {
        let data = serde_json::to_string(member)?;
        self.local.set_item(&self.config.account_key(), &data)?;

        let marker = self.cookie(
            self.config.verify_cookie(),
            Uuid::new_v4().to_string(),
            self.config.verify_max_age(),
        );
        self.cookies.set(marker)
    }

    /// Cached member, if the local cache holds one. Never contacts the
    /// identity service.
    #[must_use]
    pub fn cached_member(&self) -> Option<CachedMember> {
        let data = self.local.get_item(&self.config.account_key())?;
        match serde_json::from_str::<Option<Member>>(&data) {
            Ok(member) => member.map(CachedMember::new),
            Err(err) => {
                warn!("Ignoring unreadable cached member: {err}");
                None
            }
        }
    }

    /// Whether `_cached` may be trusted without re-verification.
    ///
    /// Evaluated on every call from the marker cookie; the answer is never
    /// stored.
    #[must_use]
    pub fn is_fresh(&self, _cached: &CachedMember) -> bool {
        self.cookies.exists(&self.config.verify_cookie())
    }
}
