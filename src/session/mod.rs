//! Authenticated session state.
//!
//! [`SessionHandle`] is the single access point for the token and the
//! current-user record: it owns the storage keys, their encoding, and the
//! mirroring into a durable [`SessionStore`]. Everything else asks it.

pub mod store;

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Result;
use crate::types::{CurrentUser, Id};

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

const TOKEN_KEY: &str = "access_token";
const USER_KEY: &str = "user";

/// Snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<CurrentUser>,
}

impl Session {
    pub fn authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Shared, mutable session state mirrored into a durable store.
///
/// Reads happen at the moment of use; callers must not hold on to a token
/// across an `.await`.
pub struct SessionHandle {
    state: RwLock<Session>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Read the persisted session once, at startup.
    ///
    /// A stored user record that no longer parses is dropped (it reads as
    /// "no user") rather than failing startup.
    pub fn restore(store: Arc<dyn SessionStore>) -> Result<Self> {
        let token = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = store.get(USER_KEY)?.and_then(|raw| {
            serde_json::from_str::<CurrentUser>(&raw)
                .inspect_err(|e| tracing::warn!("session: ignoring unreadable user record: {e}"))
                .ok()
        });
        tracing::debug!(authenticated = token.is_some(), "session: restored");
        Ok(Self {
            state: RwLock::new(Session { token, user }),
            store,
        })
    }

    /// A fresh, unauthenticated session backed by an in-memory store.
    pub fn ephemeral() -> Self {
        Self {
            state: RwLock::new(Session::default()),
            store: Arc::new(MemorySessionStore::new()),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .authenticated()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    pub fn current_user_id(&self) -> Option<Id> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .as_ref()
            .map(|u| u.id)
    }

    /// Start a session after a successful login.
    ///
    /// The user record is persisted before the token, so a stored token always
    /// has its user next to it. If either write fails both keys are removed
    /// and the session is left unauthenticated.
    pub fn establish(&self, token: String, user: CurrentUser) -> Result<()> {
        let user_json = serde_json::to_string(&user)?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let persisted = self
            .store
            .set(USER_KEY, &user_json)
            .and_then(|()| self.store.set(TOKEN_KEY, &token));
        if let Err(e) = persisted {
            tracing::warn!("session: failed to persist login: {e}");
            let _ = self.store.remove(TOKEN_KEY);
            let _ = self.store.remove(USER_KEY);
            *state = Session::default();
            return Err(e);
        }
        tracing::info!(user_id = user.id, "session: established");
        *state = Session {
            token: Some(token),
            user: Some(user),
        };
        Ok(())
    }

    /// Drop the token and user record, in memory and on disk.
    ///
    /// The in-memory state is always cleared; a store failure is logged and
    /// returned, but the session is already unauthenticated by then.
    pub fn clear(&self) -> Result<()> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = Session::default();
        }
        tracing::info!("session: cleared");
        let removed = self
            .store
            .remove(TOKEN_KEY)
            .and_then(|()| self.store.remove(USER_KEY));
        if let Err(ref e) = removed {
            tracing::warn!("session: failed to clear persisted state: {e}");
        }
        removed
    }
}
