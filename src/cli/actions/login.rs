use crate::secur::Secur;
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

/// Replaces the session with `token` and loads the member behind it.
///
/// # Errors
///
/// Returns the classified failure if the identity service rejects the
/// credential; the credential stays stored so a later navigation can retry.
pub async fn handle(secur: &Secur, token: &SecretString) -> Result<Vec<String>> {
    // The new credential replaces the session even if the old one could
    // not be fully cleared; logout has already logged why.
    if let Err(err) = secur.client().logout() {
        debug!(%err, "continuing login after failed logout");
    }
    secur.store().set_credential(token)?;

    let member = secur.client().login().await?;
    secur.state().set_ready(true);

    Ok(vec![format!(
        "logged in as {} ({})",
        member.username, member.id
    )])
}
