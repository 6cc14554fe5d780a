use crate::secur::{GuardConfig, RouteTarget, StoreConfig};
use std::path::PathBuf;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub profile: PathBuf,
    pub home_route: String,
    pub login_route: String,
    pub namespace: Option<String>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            profile: PathBuf::from(".secur/profile.json"),
            home_route: "/".to_string(),
            login_route: "/login".to_string(),
            namespace: None,
        }
    }

    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        match &self.namespace {
            Some(namespace) => StoreConfig::new().with_namespace(namespace.clone()),
            None => StoreConfig::new(),
        }
    }

    #[must_use]
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig::new(
            RouteTarget::parse(&self.home_route),
            RouteTarget::parse(&self.login_route),
        )
    }
}
