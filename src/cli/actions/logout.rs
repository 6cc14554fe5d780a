use crate::cli::router::ConsoleRouter;
use crate::secur::Secur;
use anyhow::Result;

/// Destroys the local session and sends the user to the login route.
///
/// # Errors
///
/// Returns an error if the profile cannot be cleared
pub fn handle(secur: &Secur, router: &ConsoleRouter) -> Result<Vec<String>> {
    let login = secur.guard().config().login_route().clone();
    secur.client().logout_and_redirect(router, &login)?;

    let mut lines = vec!["session destroyed".to_string()];
    lines.extend(router.visits().iter().map(|visit| visit.describe()));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::{build, testing};
    use crate::secur::Member;
    use secrecy::SecretString;
    use std::sync::Arc;

    #[test]
    fn logout_clears_profile_and_redirects() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let globals = testing::globals("http://127.0.0.1:9", &dir.path().join("profile.json"));
        let router = Arc::new(ConsoleRouter::new());
        let secur = build(&globals, router.clone())?;
        secur
            .store()
            .set_credential(&SecretString::from("token".to_string()))?;
        secur.client().update(Member::new("u1"))?;

        let lines = handle(&secur, &router)?;
        assert_eq!(
            lines,
            vec!["session destroyed".to_string(), "navigate /login".to_string()]
        );
        assert!(secur.store().credential().is_none());
        assert!(secur.store().cached_member().is_none());
        Ok(())
    }
}
