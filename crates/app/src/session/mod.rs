//! Session
//!
//! The authenticated user and the bearer token backing it. The token in
//! durable storage is the single source of truth for "am I authenticated";
//! it is always cleared before the dependent in-memory user so no window
//! exists where stale auth is presumed valid.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ApiClient;

pub mod token;

pub use token::{TokenStore, TokenStoreError};

/// Account role as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    Customer,

    /// Back-office administrator.
    Admin,
}

/// The authenticated user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-issued identifier.
    pub id: String,

    /// Display/login name.
    pub username: String,

    /// Account role.
    pub role: Role,
}

/// Process-wide session state: current user plus persisted token.
pub struct SessionStore {
    api: Arc<dyn ApiClient>,
    tokens: Arc<TokenStore>,
    user: RwLock<Option<User>>,
}

impl SessionStore {
    /// Creates a logged-out session store over the given token storage.
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>, tokens: Arc<TokenStore>) -> Self {
        Self {
            api,
            tokens,
            user: RwLock::new(None),
        }
    }

    /// Resolves a persisted token into a user at process start.
    ///
    /// With no persisted token this is a no-op. When resolution fails
    /// (expired or invalid token) the token is cleared and the store stays
    /// logged out, so a stale token is never left paired with no user.
    pub async fn resume(&self) {
        if self.tokens.get().is_none() {
            return;
        }

        match self.api.current_user().await {
            Ok(user) => {
                *self.user_mut() = Some(user);
            }
            Err(error) => {
                warn!(%error, "persisted token could not be resolved; logging out");

                if let Err(error) = self.tokens.clear() {
                    warn!(%error, "failed to clear stale token");
                }

                *self.user_mut() = None;
            }
        }
    }

    /// Attempts to log in. Returns whether a session was established.
    ///
    /// On success the token is persisted before the user is set. On any
    /// failure (bad credentials, network error, storage error) stored state
    /// is left logged out and `false` is returned; user-facing messaging is
    /// the caller's concern.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let response = match self.api.login(username, password).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "login failed");

                return false;
            }
        };

        if let Err(error) = self.tokens.set(&response.token) {
            warn!(%error, "failed to persist session token");

            return false;
        }

        *self.user_mut() = Some(response.user);

        true
    }

    /// Ends the session unconditionally. Idempotent.
    ///
    /// The persisted token is cleared before the in-memory user.
    pub fn logout(&self) {
        if let Err(error) = self.tokens.clear() {
            warn!(%error, "failed to clear persisted token on logout");
        }

        *self.user_mut() = None;
    }

    /// Returns the current user, if logged in.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.user_ref().clone()
    }

    /// Whether a user is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_ref().is_some()
    }

    /// Whether the current user is an administrator. Always `false` when
    /// logged out, never indeterminate.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user_ref()
            .as_ref()
            .is_some_and(|user| user.role == Role::Admin)
    }

    fn user_ref(&self) -> RwLockReadGuard<'_, Option<User>> {
        self.user.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn user_mut(&self) -> RwLockWriteGuard<'_, Option<User>> {
        self.user.write().unwrap_or_else(PoisonError::into_inner)
    }
}
