//! Client-side session guard.
//!
//! The guard caches the member returned by the identity service and checks
//! it again on every navigation. A short-lived marker cookie decides whether
//! the cache can be trusted as is or must be re-verified. Cryptography, token
//! issuance and server-side validation are out of scope: the session is
//! established elsewhere and only orchestrated here.
//!
//! ```rust,ignore
//! let secur = Secur::builder()
//!     .storage(Arc::new(MemoryStorage::new()))
//!     .identity(Arc::new(HttpIdentityClient::new(api_url, APP_USER_AGENT)?))
//!     .router(router)
//!     .guard_config(GuardConfig::new(RouteTarget::parse("/"), RouteTarget::parse("/login")))
//!     .build()?;
//!
//! secur.guard().before_each(&to, Some(&from), || router.proceed()).await;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod handler;
pub mod identity;
pub mod member;
pub mod route;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;

pub use config::{GuardConfig, StoreConfig};
pub use engine::{CacheState, DecisionEngine, Rejection, Verdict};
pub use error::{ErrorKind, SecurError};
pub use guard::{Outcome, SecurGuard, ACCESS_TOKEN_QUERY};
pub use handler::ErrorHandler;
pub use identity::{HttpIdentityClient, IdentityClient, RemoteFailure};
pub use member::{CachedMember, Member, Role};
pub use route::{Location, Route, RouteTarget, Router};
pub use session::SessionClient;
pub use state::{SecurSnapshot, SessionState, STATE_MODULE};
pub use storage::{
    CookieJar, FileStorage, LocalCache, MemoryStorage, SessionMedium, StorageError,
};
pub use store::SessionStore;

use std::sync::Arc;
use tracing::debug;

/// Installed plugin: one state, one store, one client and one guard sharing
/// the same injected capabilities.
#[derive(Clone, Debug)]
pub struct Secur {
    guard: SecurGuard,
}

impl Secur {
    #[must_use]
    pub fn builder() -> SecurBuilder {
        SecurBuilder::default()
    }

    #[must_use]
    pub fn guard(&self) -> &SecurGuard {
        &self.guard
    }

    #[must_use]
    pub fn client(&self) -> &SessionClient {
        self.guard.session_client()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        self.client().state()
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.client().store()
    }
}

#[derive(Default)]
pub struct SecurBuilder {
    cookies: Option<Arc<dyn CookieJar>>,
    local: Option<Arc<dyn LocalCache>>,
    medium: Option<Arc<dyn SessionMedium>>,
    identity: Option<Arc<dyn IdentityClient>>,
    router: Option<Arc<dyn Router>>,
    guard_config: Option<GuardConfig>,
    store_config: StoreConfig,
    state: Option<SessionState>,
}

impl SecurBuilder {
    /// Uses one backend for both the cookie area and the local cache.
    #[must_use]
    pub fn storage<B>(mut self, backend: Arc<B>) -> Self
    where
        B: SessionMedium + 'static,
    {
        self.cookies = Some(backend.clone());
        self.local = Some(backend.clone());
        self.medium = Some(backend);
        self
    }

    #[must_use]
    pub fn cookies(mut self, cookies: Arc<dyn CookieJar>) -> Self {
        self.cookies = Some(cookies);
        self.medium = None;
        self
    }

    #[must_use]
    pub fn local_cache(mut self, local: Arc<dyn LocalCache>) -> Self {
        self.local = Some(local);
        self.medium = None;
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: Arc<dyn IdentityClient>) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    #[must_use]
    pub fn guard_config(mut self, config: GuardConfig) -> Self {
        self.guard_config = Some(config);
        self
    }

    #[must_use]
    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Shares an existing state handle instead of creating a new one.
    #[must_use]
    pub fn state(mut self, state: SessionState) -> Self {
        self.state = Some(state);
        self
    }

    /// # Errors
    /// Returns [`SecurError::Config`] naming the first missing piece.
    pub fn build(self) -> Result<Secur, SecurError> {
        let cookies = self.cookies.ok_or(SecurError::Config("cookies"))?;
        let local = self.local.ok_or(SecurError::Config("local cache"))?;
        let identity = self.identity.ok_or(SecurError::Config("identity client"))?;
        let router = self.router.ok_or(SecurError::Config("router"))?;
        let guard_config = self.guard_config.ok_or(SecurError::Config("guard config"))?;

        let state = self.state.unwrap_or_default();
        let mut store = SessionStore::new(cookies, local, self.store_config);
        if let Some(medium) = self.medium {
            store = store.with_medium(medium);
        }
        let client = SessionClient::new(identity, store, state);
        let engine = DecisionEngine::new(client);
        debug!(module = STATE_MODULE, ?guard_config, "secur installed");

        Ok(Secur {
            guard: SecurGuard::new(engine, router, guard_config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullRouter;

    impl Router for NullRouter {
        fn push(&self, _location: &Location) {}
        fn replace(&self, _location: &Location) {}
        fn assign(&self, _url: &str) {}
    }

    struct NullIdentity;

    #[async_trait::async_trait]
    impl IdentityClient for NullIdentity {
        async fn fetch_current_user(
            &self,
            _credential: Option<&secrecy::SecretString>,
        ) -> Result<Member, RemoteFailure> {
            Err(RemoteFailure::Transport("offline".to_string()))
        }
    }

    fn guard_config() -> GuardConfig {
        GuardConfig::new(RouteTarget::parse("/"), RouteTarget::parse("/login"))
    }

    #[test]
    fn build_requires_every_capability() {
        let err = Secur::builder().build().err();
        assert_eq!(err, Some(SecurError::Config("cookies")));

        let err = Secur::builder()
            .storage(Arc::new(MemoryStorage::new()))
            .router(Arc::new(NullRouter))
            .guard_config(guard_config())
            .build()
            .err();
        assert_eq!(err, Some(SecurError::Config("identity client")));
    }

    #[test]
    fn build_shares_injected_state() {
        let state = SessionState::new();
        let secur = Secur::builder()
            .storage(Arc::new(MemoryStorage::new()))
            .identity(Arc::new(NullIdentity))
            .router(Arc::new(NullRouter))
            .guard_config(guard_config())
            .state(state.clone())
            .build()
            .expect("secur builds");

        state.set_ready(true);
        assert!(secur.state().is_ready());
        assert_eq!(secur.store().config().token_cookie(), "session::token");
    }
}
