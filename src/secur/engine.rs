//! Per-navigation session decision.
//!
//! ```text
//! NoCache ──fetch──► Authenticated | Rejected
//! CacheFresh ──────► Authenticated            (no remote call)
//! CacheStale ─fetch► Authenticated | Rejected
//! ```
//!
//! Nothing is carried between cycles: the cache state is read again on every
//! call to [`DecisionEngine::decide`].
//!
//! Trusting a fresh cache does not renew the verification marker. The window
//! is fixed from the last successful fetch rather than sliding with every
//! navigation, so an active member is still re-verified once per marker
//! max-age.

use super::error::SecurError;
use super::member::{CachedMember, Member};
use super::route::Route;
use super::session::SessionClient;
use super::state::Cycle;
use tracing::{info, warn};

/// Cache state observed at the start of a cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheState {
    NoCache,
    Fresh(CachedMember),
    Stale(CachedMember),
}

/// A failed cycle with everything the redirect policy needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub error: SecurError,
    pub to: Route,
    /// Where a transient failure may send the user back to. Only set when a
    /// first login into a protected route failed.
    pub from: Option<Route>,
    /// Whether a cached session existed when the cycle started. User-facing
    /// messages are only shown when it did.
    pub session_existed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Authenticated(Member),
    Rejected(Rejection),
    /// A newer cycle started while this one waited on the identity service;
    /// nothing was applied.
    Superseded,
}

#[derive(Clone, Debug)]
pub struct DecisionEngine {
    session: SessionClient,
}

impl DecisionEngine {
    #[must_use]
    pub fn new(session: SessionClient) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    #[must_use]
    pub fn inspect(&self) -> CacheState {
        let store = self.session.store();
        match store.cached_member() {
            None => CacheState::NoCache,
            Some(cached) if store.is_fresh(&cached) => CacheState::Fresh(cached),
            Some(cached) => CacheState::Stale(cached),
        }
    }

    /// Runs one decision for `cycle`.
    ///
    /// Nothing is applied once a later cycle has started, including results
    /// of a remote call that was already in flight.
    pub async fn decide(&self, cycle: Cycle, to: &Route, from: Option<&Route>) -> Verdict {
        let state = self.session.state();
        if !state.is_current(cycle) {
            warn!(cycle = cycle.sequence(), "navigation superseded before deciding");
            return Verdict::Superseded;
        }
        let cache = self.inspect();
        let session_existed = !matches!(cache, CacheState::NoCache);
        // The source route is only a fallback when a first login into a
        // protected route fails. Handing it over for a public target would
        // send the user back to a protected page that fails the same way.
        let fallback = (!session_existed && to.requires_auth)
            .then(|| from.cloned())
            .flatten();
        let reject = |error: SecurError| {
            Verdict::Rejected(Rejection {
                error,
                to: to.clone(),
                from: fallback.clone(),
                session_existed,
            })
        };

        let fetched = match cache {
            CacheState::Fresh(cached) => {
                let member = cached.into_member();
                info!(member = %member.id, username = %member.username, "Session still valid.");
                state.set_member(Some(member.clone()));
                state.set_ready(true);
                return Verdict::Authenticated(member);
            }
            CacheState::Stale(cached) => {
                let member = cached.into_member();
                info!(member = %member.id, username = %member.username, "Expired. Verifying session...");
                state.set_member(Some(member));
                self.session.fetch().await
            }
            CacheState::NoCache => self.session.fetch().await,
        };

        if !state.is_current(cycle) {
            warn!(cycle = cycle.sequence(), "navigation superseded, discarding session result");
            return Verdict::Superseded;
        }

        let member = match fetched {
            Ok(member) => member,
            Err(err) => return reject(err),
        };
        if let Err(err) = self.session.update(member.clone()) {
            return reject(err);
        }
        state.set_ready(true);
        if session_existed {
            info!(member = %member.id, username = %member.username, "Session verified.");
        } else {
            info!(member = %member.id, username = %member.username, "successfully logged in.");
        }
        Verdict::Authenticated(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secur::config::StoreConfig;
    use crate::secur::identity::{IdentityClient, RemoteFailure};
    use crate::secur::state::SessionState;
    use crate::secur::storage::{CookieJar, MemoryStorage};
    use crate::secur::store::SessionStore;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use time::Duration;

    struct CountingIdentity {
        result: Result<Member, RemoteFailure>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityClient for CountingIdentity {
        async fn fetch_current_user(
            &self,
            _credential: Option<&SecretString>,
        ) -> Result<Member, RemoteFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn engine(
        result: Result<Member, RemoteFailure>,
    ) -> (Arc<MemoryStorage>, Arc<CountingIdentity>, DecisionEngine) {
        let backend = Arc::new(MemoryStorage::new());
        let identity = Arc::new(CountingIdentity {
            result,
            calls: AtomicUsize::new(0),
        });
        let store = SessionStore::with_backend(backend.clone(), StoreConfig::default());
        let session = SessionClient::new(identity.clone(), store, SessionState::new());
        (backend, identity, DecisionEngine::new(session))
    }

    #[tokio::test]
    async fn fresh_cache_skips_remote_call() {
        let (_, identity, engine) = engine(Ok(Member::new("remote")));
        engine.session().update(Member::new("cached")).expect("update");
        let cycle = engine.session().state().begin_cycle();

        let verdict = engine.decide(cycle, &Route::protected("/app"), None).await;
        assert_eq!(verdict, Verdict::Authenticated(Member::new("cached")));
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
        assert!(engine.session().state().is_ready());
    }

    #[tokio::test]
    async fn fresh_cache_keeps_marker_window() {
        let (backend, _, engine) = engine(Ok(Member::new("remote")));
        engine.session().update(Member::new("cached")).expect("update");
        let marker = backend.get("session::verify");

        backend.advance(Duration::minutes(30));
        let cycle = engine.session().state().begin_cycle();
        engine.decide(cycle, &Route::protected("/app"), None).await;
        assert_eq!(backend.get("session::verify"), marker);

        // Still expires one hour after the last fetch.
        backend.advance(Duration::minutes(31));
        assert!(matches!(engine.inspect(), CacheState::Stale(_)));
    }

    #[tokio::test]
    async fn stale_cache_makes_one_remote_call() {
        let (backend, identity, engine) = engine(Ok(Member::new("u1").with_username("fresh")));
        engine.session().update(Member::new("u1")).expect("update");
        backend.advance(Duration::hours(2));
        assert!(matches!(engine.inspect(), CacheState::Stale(_)));

        let cycle = engine.session().state().begin_cycle();
        let verdict = engine.decide(cycle, &Route::protected("/app"), None).await;
        assert_eq!(
            verdict,
            Verdict::Authenticated(Member::new("u1").with_username("fresh"))
        );
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(engine.inspect(), CacheState::Fresh(_)));
    }

    #[tokio::test]
    async fn no_cache_failure_is_rejected_without_prior_session() {
        let (_, identity, engine) = engine(Err(RemoteFailure::Status {
            code: 404,
            message: None,
        }));
        let cycle = engine.session().state().begin_cycle();
        let to = Route::protected("/app");

        let verdict = engine.decide(cycle, &to, None).await;
        assert_eq!(
            verdict,
            Verdict::Rejected(Rejection {
                error: SecurError::AccountNotFound,
                to,
                from: None,
                session_existed: false,
            })
        );
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn superseded_cycle_applies_nothing() {
        let (_, _, engine) = engine(Ok(Member::new("u1")));
        let state = engine.session().state().clone();
        let stale = state.begin_cycle();
        let _newer = state.begin_cycle();

        let verdict = engine.decide(stale, &Route::protected("/app"), None).await;
        assert_eq!(verdict, Verdict::Superseded);
        assert!(engine.session().store().cached_member().is_none());
        assert!(state.member().is_none());
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn public_target_drops_source_route() {
        let (_, _, engine) = engine(Err(RemoteFailure::Transport("offline".to_string())));
        let cycle = engine.session().state().begin_cycle();
        let from = Route::protected("/app");

        let verdict = engine
            .decide(cycle, &Route::public("/about"), Some(&from))
            .await;
        let Verdict::Rejected(rejection) = verdict else {
            panic!("expected a rejection");
        };
        assert_eq!(rejection.from, None);
        assert!(!rejection.session_existed);
    }

    #[tokio::test]
    async fn protected_first_login_keeps_source_route() {
        let (_, _, engine) = engine(Err(RemoteFailure::Transport("offline".to_string())));
        let cycle = engine.session().state().begin_cycle();
        let from = Route::public("/pricing");

        let verdict = engine
            .decide(cycle, &Route::protected("/app"), Some(&from))
            .await;
        let Verdict::Rejected(rejection) = verdict else {
            panic!("expected a rejection");
        };
        assert_eq!(rejection.from, Some(from));
    }
}
