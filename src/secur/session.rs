//! Session operations shared by the guard and the host application.
//!
//! Every write goes to the persistent store first and to the session state
//! second, so the state never shows a member the store does not hold.

use super::error::SecurError;
use super::identity::IdentityClient;
use super::member::Member;
use super::route::{RouteTarget, Router};
use super::state::SessionState;
use super::store::SessionStore;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct SessionClient {
    identity: Arc<dyn IdentityClient>,
    store: SessionStore,
    state: SessionState,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("store", &self.store)
            .field("state", &self.state.snapshot())
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityClient>, store: SessionStore, state: SessionState) -> Self {
        Self {
            identity,
            store,
            state,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Asks the identity service for the member behind the stored credential
    /// without touching the store or the state.
    ///
    /// # Errors
    /// Returns the classified failure.
    pub async fn fetch(&self) -> Result<Member, SecurError> {
        let credential = self.store.credential();
        self.identity
            .fetch_current_user(credential.as_ref())
            .await
            .map_err(SecurError::classify)
    }

    /// Loads the current member and caches it.
    ///
    /// # Errors
    /// Returns the classified failure, or `Internal` if the cache cannot be
    /// written.
    pub async fn login(&self) -> Result<Member, SecurError> {
        let member = self.fetch().await?;
        self.update(member.clone())?;
        Ok(member)
    }

    /// Re-fetches the member with the current credential, refreshing the
    /// cache and its freshness window.
    ///
    /// # Errors
    /// Returns the classified failure.
    pub async fn verify(&self) -> Result<(), SecurError> {
        self.login().await.map(|_| ())
    }

    /// Write-through update of the member.
    ///
    /// # Errors
    /// Returns `Internal` if the cache cannot be written; the state is left
    /// untouched in that case.
    pub fn update(&self, member: Member) -> Result<(), SecurError> {
        self.store.cache_member(&member)?;
        self.state.set_member(Some(member));
        Ok(())
    }

    /// Destroys the local session. The state is reset even if the store
    /// could not be fully cleared.
    ///
    /// # Errors
    /// Returns `Internal` if the store cannot be cleared.
    pub fn logout(&self) -> Result<(), SecurError> {
        let cleared = self.store.clear();
        self.state.reset();
        if let Err(err) = &cleared {
            error!("Failed to clear session store: {err}");
        }
        info!("session destroyed");
        cleared.map_err(SecurError::from)
    }

    /// Logs out, then navigates to `target`.
    ///
    /// # Errors
    /// Returns `Internal` if the store cannot be cleared; no navigation
    /// happens in that case.
    pub fn logout_and_redirect(&self, router: &dyn Router, target: &RouteTarget) -> Result<(), SecurError> {
        self.logout()?;
        router.navigate(target);
        Ok(())
    }
}
