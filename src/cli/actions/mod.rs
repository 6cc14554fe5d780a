pub mod login;
pub mod logout;
pub mod navigate;
pub mod status;

use crate::cli::{globals::GlobalArgs, router::ConsoleRouter};
use crate::secur::{FileStorage, HttpIdentityClient, Secur};
use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub enum Action {
    Login { token: SecretString },
    Navigate(navigate::Args),
    Status,
    Logout,
}

impl Action {
    /// Execute the action and print its report on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be built or the action fails
    pub async fn execute(self, globals: &GlobalArgs) -> Result<()> {
        let router = Arc::new(ConsoleRouter::new());
        let secur = build(globals, router.clone())?;

        let lines = match self {
            Self::Login { token } => login::handle(&secur, &token).await?,
            Self::Navigate(args) => navigate::handle(&secur, &router, &args).await,
            Self::Status => status::handle(&secur),
            Self::Logout => logout::handle(&secur, &router)?,
        };

        for line in lines {
            println!("{line}");
        }

        Ok(())
    }
}

/// Wires the profile file, the identity service and the console router into
/// one installed session guard.
///
/// # Errors
///
/// Returns an error if the identity service URL is invalid
pub fn build(globals: &GlobalArgs, router: Arc<ConsoleRouter>) -> Result<Secur> {
    let identity = HttpIdentityClient::new(&globals.api_url, APP_USER_AGENT)
        .context("invalid SECUR_API_URL")?;
    debug!(profile = %globals.profile.display(), endpoint = %identity.endpoint(), "building secur");

    let secur = Secur::builder()
        .storage(Arc::new(FileStorage::new(&globals.profile)))
        .identity(Arc::new(identity))
        .router(router)
        .store_config(globals.store_config())
        .guard_config(globals.guard_config())
        .build()?;

    Ok(secur)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::net::TcpListener;
    use std::path::Path;

    pub fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    pub fn globals(api_url: &str, profile: &Path) -> GlobalArgs {
        let mut globals = GlobalArgs::new(api_url.to_string());
        globals.profile = profile.to_path_buf();
        globals.home_route = "/home".to_string();
        globals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_invalid_api_url() {
        let globals = GlobalArgs::new("not a url".to_string());
        let err = build(&globals, Arc::new(ConsoleRouter::new())).err();
        assert!(err.is_some_and(|err| err.to_string().contains("invalid SECUR_API_URL")));
    }
}
