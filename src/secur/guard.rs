//! Navigation interceptor: the router's pre-navigation hook.
//!
//! The continuation is called before the session decision resolves, so
//! navigation never waits on the identity service. The UI synchronizes on the
//! `ready` flag of the session state instead.
//!
//! Flow Overview:
//! 1) A one-time `accessToken` query credential replaces the session and is
//!    stripped from the history entry.
//! 2) Navigation proceeds.
//! 3) `ready` drops when entering a protected route from a public one and is
//!    raised at once for public targets.
//! 4) The decision engine runs.
//! 5) Network/internal failures keep the session and may send the user back.
//! 6) Not-found/invalid-session failures end the session and may send the
//!    user to login.

use super::config::GuardConfig;
use super::engine::{DecisionEngine, Rejection, Verdict};
use super::error::{ErrorKind, SecurError};
use super::member::Member;
use super::route::{Route, RouteTarget, Router};
use super::session::SessionClient;
use super::state::Cycle;
use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Query parameter carrying a one-time session credential.
pub const ACCESS_TOKEN_QUERY: &str = "accessToken";

/// Result of one navigation cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Authenticated(Member),
    Rejected {
        error: SecurError,
        redirect: Option<RouteTarget>,
    },
    /// A later navigation took over before this one resolved.
    Superseded,
}

#[derive(Clone)]
pub struct SecurGuard {
    engine: DecisionEngine,
    router: Arc<dyn Router>,
    config: GuardConfig,
}

impl fmt::Debug for SecurGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurGuard")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SecurGuard {
    #[must_use]
    pub fn new(engine: DecisionEngine, router: Arc<dyn Router>, config: GuardConfig) -> Self {
        Self {
            engine,
            router,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    #[must_use]
    pub fn session_client(&self) -> &SessionClient {
        self.engine.session()
    }

    fn session(&self) -> &SessionClient {
        self.engine.session()
    }

    /// Runs a full cycle. `next` is called before the decision is awaited.
    pub async fn before_each<F>(&self, to: &Route, from: Option<&Route>, next: F) -> Outcome
    where
        F: FnOnce(),
    {
        let (cycle, to) = self.enter(to, from, next);
        self.resolve(cycle, &to, from).await
    }

    /// Like [`SecurGuard::before_each`], but the decision runs as a Tokio
    /// task and this returns as soon as `next` has been called.
    pub fn intercept<F>(&self, to: Route, from: Option<Route>, next: F) -> JoinHandle<Outcome>
    where
        F: FnOnce(),
    {
        let (cycle, to) = self.enter(&to, from.as_ref(), next);
        let guard = self.clone();
        tokio::spawn(async move { guard.resolve(cycle, &to, from.as_ref()).await })
    }

    /// Synchronous part of a cycle: credential bootstrap, continuation and
    /// ready toggles.
    fn enter<F>(&self, to: &Route, from: Option<&Route>, next: F) -> (Cycle, Route)
    where
        F: FnOnce(),
    {
        let state = self.session().state();
        let cycle = state.begin_cycle();
        let to = self.bootstrap_credential(to);

        next();

        let from_requires_auth = from.is_some_and(|route| route.requires_auth);
        if !from_requires_auth && to.requires_auth {
            debug!(to = %to.location, "entering protected route, secur not ready");
            state.set_ready(false);
        }
        if !to.requires_auth {
            state.set_ready(true);
        }

        (cycle, to)
    }

    /// Replaces the session with a credential found in the query and strips
    /// it from the current history entry.
    fn bootstrap_credential(&self, to: &Route) -> Route {
        let Some(token) = to.location.query.get(ACCESS_TOKEN_QUERY) else {
            return to.clone();
        };
        let token = SecretString::from(token.clone());

        // The query credential replaces the session even if the old one
        // could not be fully cleared; logout has already logged why.
        if let Err(err) = self.session().logout() {
            debug!(%err, "continuing bootstrap after failed logout");
        }
        if let Err(err) = self.session().store().set_credential(&token) {
            error!("Failed to store query credential: {err}");
        }

        let mut stripped = to.clone();
        stripped.location.query.remove(ACCESS_TOKEN_QUERY);
        self.router.replace(&stripped.location);
        info!(to = %stripped.location, "session bootstrapped from query credential");
        stripped
    }

    async fn resolve(&self, cycle: Cycle, to: &Route, from: Option<&Route>) -> Outcome {
        match self.engine.decide(cycle, to, from).await {
            Verdict::Authenticated(member) => Outcome::Authenticated(member),
            Verdict::Superseded => Outcome::Superseded,
            Verdict::Rejected(rejection) => self.reject(rejection),
        }
    }

    fn reject(&self, rejection: Rejection) -> Outcome {
        let Rejection {
            error,
            to,
            from,
            session_existed,
        } = rejection;
        let state = self.session().state();
        let handler = self.config.error_handler();

        let redirect = if error.is_transient() {
            let from_requires_auth = from.as_ref().is_some_and(|route| route.requires_auth);
            let redirect = ((to.requires_auth || from_requires_auth) && !state.has_member())
                .then(|| {
                    from.map_or_else(
                        || self.config.home_route().clone(),
                        |route| RouteTarget::Route(route.location),
                    )
                });
            state.set_ready(true);
            if let Some(target) = &redirect {
                debug!(%target, kind = ?error.kind(), "redirecting after transient failure");
                self.router.navigate(target);
            }
            if let Some(handler) = handler {
                handler.handle_error(&error);
            }
            redirect
        } else {
            // The service rejected the session, so the redirect applies even
            // if the store could not be cleared; logout has already logged why.
            if let Err(err) = self.session().logout() {
                debug!(%err, "redirecting after failed logout");
            }
            state.set_ready(true);
            if session_existed {
                if let Some(handler) = handler {
                    match error.kind() {
                        ErrorKind::AccountNotFound => handler.handle_account_not_found(&error),
                        _ => handler.handle_session_expired(&error),
                    }
                }
            }
            let redirect = to.requires_auth.then(|| self.config.login_route().clone());
            if let Some(target) = &redirect {
                debug!(%target, kind = ?error.kind(), "redirecting to login");
                self.router.navigate(target);
            }
            redirect
        };

        Outcome::Rejected { error, redirect }
    }
}
