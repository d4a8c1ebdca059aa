//! The signed-in session, kept in memory and mirrored to the local store.

use crate::{AuthSession, User};
use dawa_cache::{Cache, CacheError, Slot};
use dawa_data::TokenStore;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage key of the persisted session.
pub const AUTH_STORAGE_KEY: &str = "auth:session";

/// Holds the current session, if any.
///
/// Shared between the front-end and the [`dawa_data::ApiClient`] (as its
/// [`TokenStore`]), so every method takes `&self`.
#[derive(Debug)]
pub struct AuthStore {
    current: Mutex<Option<AuthSession>>,
    slot: Slot<AuthSession>,
}

impl AuthStore {
    /// Rehydrate from `cache`. An unreadable stored session counts as signed out.
    pub fn load(cache: Cache) -> Self {
        let slot: Slot<AuthSession> = Slot::new(cache, AUTH_STORAGE_KEY);
        let current = slot.load_or_discard();
        if let Some(session) = &current {
            tracing::debug!(user_id = session.user.id, "restored session");
        }
        Self {
            current: Mutex::new(current),
            slot,
        }
    }

    pub fn in_memory() -> Self {
        Self::load(Cache::memory())
    }

    fn lock(&self) -> MutexGuard<'_, Option<AuthSession>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.lock().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.lock().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Replace the session and persist it.
    pub fn sign_in(&self, session: AuthSession) -> Result<(), CacheError> {
        let mut current = self.lock();
        self.slot.store(&session)?;
        tracing::info!(user_id = session.user.id, "signed in");
        *current = Some(session);
        Ok(())
    }

    /// Forget the session locally and in storage.
    pub fn sign_out(&self) -> Result<(), CacheError> {
        let mut current = self.lock();
        *current = None;
        self.slot.clear()
    }
}

impl TokenStore for AuthStore {
    fn access_token(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.lock().as_ref().and_then(|s| s.refresh_token.clone())
    }

    fn update_tokens(&self, access: String, refresh: Option<String>) {
        let mut current = self.lock();
        let Some(session) = current.as_mut() else {
            return;
        };
        session.rotate(access, refresh);
        if let Err(e) = self.slot.store(session) {
            tracing::warn!(error = %e, "failed to persist refreshed session");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.sign_out() {
            tracing::warn!(error = %e, "failed to remove stored session");
        }
    }
}
