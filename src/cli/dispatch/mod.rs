//! Maps validated CLI matches to an action and the settings it runs with.

use crate::cli::actions::{navigate, Action};
use crate::cli::commands::{
    ARG_API_URL, ARG_HOME_ROUTE, ARG_LOGIN_ROUTE, ARG_NAMESPACE, ARG_PROFILE, CMD_LOGIN,
    CMD_LOGOUT, CMD_NAVIGATE, CMD_STATUS,
};
use crate::cli::globals::GlobalArgs;
use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;

    let mut globals = GlobalArgs::new(api_url);
    if let Some(profile) = matches.get_one::<String>(ARG_PROFILE) {
        globals.profile = PathBuf::from(profile);
    }
    if let Some(home) = matches.get_one::<String>(ARG_HOME_ROUTE) {
        globals.home_route.clone_from(home);
    }
    if let Some(login) = matches.get_one::<String>(ARG_LOGIN_ROUTE) {
        globals.login_route.clone_from(login);
    }
    globals.namespace = matches.get_one::<String>(ARG_NAMESPACE).cloned();

    Ok(globals)
}

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = globals(matches)?;

    let action = match matches.subcommand() {
        Some((CMD_LOGIN, sub)) => Action::Login {
            token: sub
                .get_one::<String>("token")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --token")?,
        },
        Some((CMD_NAVIGATE, sub)) => Action::Navigate(navigate::Args {
            to: sub
                .get_one::<String>("to")
                .cloned()
                .context("missing navigation target")?,
            from: sub.get_one::<String>("from").cloned(),
            requires_auth: sub.get_flag("requires-auth"),
            from_requires_auth: sub.get_flag("from-requires-auth"),
        }),
        Some((CMD_STATUS, _)) => Action::Status,
        Some((CMD_LOGOUT, _)) => Action::Logout,
        Some((other, _)) => bail!("unknown subcommand: {other}"),
        None => bail!("missing subcommand"),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn api_url_required() {
        temp_env::with_vars([("SECUR_API_URL", None::<&str>)], || {
            let matches = crate::cli::commands::new().get_matches_from(vec!["secur", "status"]);
            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err
                    .to_string()
                    .contains("missing required argument: --api-url"));
            }
        });
    }

    #[test]
    fn navigate_maps_flags() {
        temp_env::with_vars(
            [
                ("SECUR_API_URL", Some("https://api.tld")),
                ("SECUR_NAMESPACE", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec![
                    "secur",
                    "navigate",
                    "/app",
                    "--from",
                    "/settings",
                    "--requires-auth",
                    "--from-requires-auth",
                ]);
                let (action, globals) = handler(&matches).expect("dispatch");
                assert_eq!(globals.api_url, "https://api.tld");
                assert_eq!(globals.namespace, None);
                let Action::Navigate(args) = action else {
                    panic!("expected navigate action");
                };
                assert_eq!(args.to, "/app");
                assert_eq!(args.from.as_deref(), Some("/settings"));
                assert!(args.requires_auth);
                assert!(args.from_requires_auth);
            },
        );
    }

    #[test]
    fn login_keeps_token_secret() {
        temp_env::with_vars(
            [
                ("SECUR_API_URL", Some("https://api.tld")),
                ("SECUR_TOKEN", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec![
                    "secur", "login", "--token", "abc",
                ]);
                let (action, _) = handler(&matches).expect("dispatch");
                let Action::Login { token } = action else {
                    panic!("expected login action");
                };
                assert_eq!(token.expose_secret(), "abc");
            },
        );
    }
}
