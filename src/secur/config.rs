//! Store layout and guard redirect configuration.

use super::handler::ErrorHandler;
use super::route::RouteTarget;
use cookie::SameSite;
use std::fmt;
use std::sync::Arc;
use time::Duration;

const DEFAULT_TOKEN_COOKIE: &str = "session::token";
const DEFAULT_VERIFY_COOKIE: &str = "session::verify";
const DEFAULT_ACCOUNT_KEY: &str = "account_data";
const DEFAULT_CREDENTIAL_TTL: Duration = Duration::days(7);
const DEFAULT_VERIFY_MAX_AGE: Duration = Duration::hours(1);

/// Names and lifetimes of persisted session entries.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    namespace: Option<String>,
    credential_ttl: Duration,
    verify_max_age: Duration,
    cookie_path: String,
    cookie_domain: Option<String>,
    cookie_secure: bool,
    same_site: Option<SameSite>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace: None,
            credential_ttl: DEFAULT_CREDENTIAL_TTL,
            verify_max_age: DEFAULT_VERIFY_MAX_AGE,
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_secure: false,
            same_site: None,
        }
    }

    /// Prefixes every cookie name and cache key, e.g. `acme_session::token`.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.trim().is_empty()).then_some(namespace);
        self
    }

    #[must_use]
    pub fn with_credential_ttl(mut self, ttl: Duration) -> Self {
        self.credential_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_verify_max_age(mut self, max_age: Duration) -> Self {
        self.verify_max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    #[must_use]
    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    fn namespaced(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}_{name}"),
            None => name.to_string(),
        }
    }

    #[must_use]
    pub fn token_cookie(&self) -> String {
        self.namespaced(DEFAULT_TOKEN_COOKIE)
    }

    #[must_use]
    pub fn verify_cookie(&self) -> String {
        self.namespaced(DEFAULT_VERIFY_COOKIE)
    }

    #[must_use]
    pub fn account_key(&self) -> String {
        self.namespaced(DEFAULT_ACCOUNT_KEY)
    }

    #[must_use]
    pub fn credential_ttl(&self) -> Duration {
        self.credential_ttl
    }

    #[must_use]
    pub fn verify_max_age(&self) -> Duration {
        self.verify_max_age
    }

    pub(crate) fn cookie_path(&self) -> &str {
        &self.cookie_path
    }

    pub(crate) fn cookie_domain(&self) -> Option<&str> {
        self.cookie_domain.as_deref()
    }

    pub(crate) fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    pub(crate) fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }
}

/// Redirect targets and optional error hooks for the navigation guard.
#[derive(Clone)]
pub struct GuardConfig {
    home_route: RouteTarget,
    login_route: RouteTarget,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl GuardConfig {
    #[must_use]
    pub fn new(home_route: RouteTarget, login_route: RouteTarget) -> Self {
        Self {
            home_route,
            login_route,
            error_handler: None,
        }
    }

    #[must_use]
    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn home_route(&self) -> &RouteTarget {
        &self.home_route
    }

    #[must_use]
    pub fn login_route(&self) -> &RouteTarget {
        &self.login_route
    }

    #[must_use]
    pub fn error_handler(&self) -> Option<&dyn ErrorHandler> {
        self.error_handler.as_deref()
    }
}

impl fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardConfig")
            .field("home_route", &self.home_route)
            .field("login_route", &self.login_route)
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secur::route::Location;

    #[test]
    fn default_layout_matches_persisted_names() {
        let config = StoreConfig::default();
        assert_eq!(config.token_cookie(), "session::token");
        assert_eq!(config.verify_cookie(), "session::verify");
        assert_eq!(config.account_key(), "account_data");
        assert_eq!(config.credential_ttl(), Duration::days(7));
        assert_eq!(config.verify_max_age(), Duration::hours(1));
        assert_eq!(config.cookie_path(), "/");
    }

    #[test]
    fn namespace_prefixes_every_name() {
        let config = StoreConfig::new().with_namespace("acme");
        assert_eq!(config.token_cookie(), "acme_session::token");
        assert_eq!(config.verify_cookie(), "acme_session::verify");
        assert_eq!(config.account_key(), "acme_account_data");
    }

    #[test]
    fn blank_namespace_is_ignored() {
        let config = StoreConfig::new().with_namespace("  ");
        assert_eq!(config.token_cookie(), "session::token");
    }

    #[test]
    fn guard_config_without_handler() {
        let config = GuardConfig::new(
            RouteTarget::Route(Location::new("/")),
            RouteTarget::parse("https://accounts.example.com/login"),
        );
        assert!(config.error_handler().is_none());
        assert!(matches!(config.login_route(), RouteTarget::External(_)));
    }
}
