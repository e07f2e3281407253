//! Session lifecycle management
//!
//! This module coordinates the authentication token, the current-user
//! identity, and their persisted copy into a single authority used by
//! every resource call.
//!
//! The [`SessionManager`] is the sole writer of the transport's
//! credential slot. Callers interact with it through five lifecycle
//! methods:
//!
//! - [`SessionManager::init`] -- rehydrate a persisted session and verify
//!   it against the server before trusting it.
//! - [`SessionManager::login`] / [`SessionManager::register`] -- exchange
//!   credentials for a fresh token and persist the pair.
//! - [`SessionManager::logout`] -- best-effort server notification, then
//!   unconditional local teardown.
//! - [`SessionManager::expire`] -- the global reaction to a `401` seen by
//!   any resource call: purge local state, stay out of the caller's way.
//!
//! # State machine
//!
//! `Uninitialized -> Resolving -> Authenticated | Anonymous`. A session
//! leaves `Authenticated` only through `logout` or an observed `401`.
//! There is no path back to `Resolving` except a fresh `init` or a new
//! credential exchange. While `Resolving`, the unverified token sits in
//! the transport slot so the profile fetch can present it; the window
//! ends in either a verified user or a purge, never a token with no user.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{ApiError, Result};
use crate::models::{AuthResponse, Credentials, ProfileUpdate, Registration, User};
use crate::transport::Transport;

pub mod store;

pub use store::{Session, SessionStore};

/// Credential exchange endpoint.
const LOGIN_PATH: &str = "/users/login/";
/// Registration endpoint; returns the same `{token, user}` shape as login.
const REGISTER_PATH: &str = "/users/registro/";
/// Best-effort server-side token invalidation.
const LOGOUT_PATH: &str = "/users/logout/";
/// Current-user profile endpoint (GET to read, PUT to update).
const PROFILE_PATH: &str = "/users/perfil/";

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No lifecycle method has run yet.
    Uninitialized,
    /// A persisted token is being verified against the server.
    Resolving,
    /// The token was accepted and resolved to this user.
    Authenticated(User),
    /// No valid session; requests go out without credentials.
    Anonymous,
}

/// Single authority over authentication state.
///
/// Cloning shares the underlying state: the token slot lives in the
/// transport and the state cell is reference-counted, so every clone
/// observes the same session.
#[derive(Debug, Clone)]
pub struct SessionManager {
    transport: Transport,
    store: SessionStore,
    state: Arc<RwLock<SessionState>>,
}

impl SessionManager {
    /// Create a manager over the given transport and persistence store.
    ///
    /// The session starts `Uninitialized`; call [`SessionManager::init`]
    /// to rehydrate any persisted state.
    pub fn new(transport: Transport, store: SessionStore) -> Self {
        Self {
            transport,
            store,
            state: Arc::new(RwLock::new(SessionState::Uninitialized)),
        }
    }

    /// Rehydrate the persisted session, if any, and verify it.
    ///
    /// When a token is found it is installed in the transport slot and
    /// the profile is fetched from the server. The fetched profile wins
    /// over the persisted copy, catching server-side changes made from
    /// another device. On any failure, network or rejection, the
    /// persisted state is purged and the session ends `Anonymous`: a
    /// token the server will not vouch for is not kept around.
    ///
    /// Returns the authenticated user, or `None` when the session ends
    /// `Anonymous`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] only if purging the session file
    /// itself fails; server rejection is not an error here.
    pub async fn init(&self) -> Result<Option<User>> {
        let persisted = match self.store.load() {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("Persisted session unreadable, starting anonymous: {}", e);
                self.store.clear()?;
                None
            }
        };

        let Some(session) = persisted else {
            self.transport.set_token(None).await;
            self.set_state(SessionState::Anonymous).await;
            return Ok(None);
        };

        self.set_state(SessionState::Resolving).await;
        self.transport.set_token(Some(session.token.clone())).await;

        match self.transport.get_json::<User>(PROFILE_PATH).await {
            Ok(profile) => {
                self.store.save(&Session {
                    token: session.token,
                    user: profile.clone(),
                })?;
                self.set_state(SessionState::Authenticated(profile.clone())).await;
                tracing::debug!("Session restored for {}", profile.username);
                Ok(Some(profile))
            }
            Err(e) => {
                tracing::warn!("Persisted session rejected, purging: {}", e);
                self.purge().await?;
                Ok(None)
            }
        }
    }

    /// Exchange a username and password for a fresh session.
    ///
    /// The request is sent without credentials even when a stale token is
    /// still installed. On success the token slot is updated before this
    /// returns, so a call issued immediately afterwards carries the new
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCredentials`] when the server rejects
    /// the pair; no local state is touched on failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .transport
            .post_public(LOGIN_PATH, &credentials)
            .await
            .map_err(reject_credentials)?;
        tracing::debug!("Logged in as {}", auth.user.username);
        self.establish(auth).await
    }

    /// Create an account and start a session in one step.
    ///
    /// The server returns the same `{token, user}` shape as login.
    /// Field-level rejections (username taken, weak password) surface as
    /// [`ApiError::ValidationFailed`] with the server text verbatim.
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let auth: AuthResponse = self
            .transport
            .post_public(REGISTER_PATH, registration)
            .await
            .map_err(|e| match e {
                ApiError::ValidationFailed { .. } => e,
                other => reject_credentials(other),
            })?;
        tracing::debug!("Registered account {}", auth.user.username);
        self.establish(auth).await
    }

    /// Tear the session down.
    ///
    /// The server is notified best-effort; a failed notification is
    /// logged and swallowed because the local teardown must happen
    /// regardless. Always ends `Anonymous`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] only if removing the session file
    /// fails.
    pub async fn logout(&self) -> Result<()> {
        if self.transport.current_token().await.is_some() {
            if let Err(e) = self.transport.post_empty(LOGOUT_PATH).await {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }
        self.purge().await
    }

    /// Fetch the current profile from the server.
    pub async fn profile(&self) -> Result<User> {
        self.guard(self.transport.get_json(PROFILE_PATH).await).await
    }

    /// Send a partial profile update.
    ///
    /// On success the cached and persisted user are replaced with the
    /// server's response. On failure the cached user is left untouched
    /// and the error surfaces, except for a `401`, which expires the
    /// whole session like any other authenticated call.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let user: User = self
            .guard(self.transport.put_json(PROFILE_PATH, update).await)
            .await?;
        if let Some(token) = self.transport.current_token().await {
            self.store.save(&Session {
                token,
                user: user.clone(),
            })?;
        }
        self.set_state(SessionState::Authenticated(user.clone())).await;
        Ok(user)
    }

    /// React to an authentication rejection observed by any call.
    ///
    /// Clears the token slot, the persisted file, and the in-memory
    /// state. Best-effort: a failure to remove the file is logged, not
    /// surfaced, because this runs inside another error's propagation.
    pub async fn expire(&self) {
        tracing::warn!("Server rejected the session token, logging out locally");
        self.transport.set_token(None).await;
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear persisted session: {}", e);
        }
        self.set_state(SessionState::Anonymous).await;
    }

    /// Pass a call result through the global `401` interception: an
    /// [`ApiError::AuthenticationRequired`] expires the session locally
    /// before propagating to the caller untouched.
    pub async fn guard<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            if e.is_auth_expiry() {
                self.expire().await;
            }
        }
        result
    }

    /// The current lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// The authenticated user, when there is one.
    pub async fn current_user(&self) -> Option<User> {
        match &*self.state.read().await {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Whether the session is currently authenticated.
    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Authenticated(_))
    }

    /// Install a fresh `{token, user}` pair: persist it, publish the
    /// token to the transport slot, then mark the session authenticated.
    async fn establish(&self, auth: AuthResponse) -> Result<User> {
        self.store.save(&Session {
            token: auth.token.clone(),
            user: auth.user.clone(),
        })?;
        self.transport.set_token(Some(auth.token)).await;
        self.set_state(SessionState::Authenticated(auth.user.clone())).await;
        Ok(auth.user)
    }

    /// Remove every trace of the session: token slot first so no request
    /// can pick it up, then the in-memory state, then the file. The
    /// session always ends `Anonymous`; a failed file removal surfaces
    /// only after the in-memory teardown is complete.
    async fn purge(&self) -> Result<()> {
        self.transport.set_token(None).await;
        self.set_state(SessionState::Anonymous).await;
        self.store.clear()?;
        Ok(())
    }

    async fn set_state(&self, state: SessionState) {
        let mut slot = self.state.write().await;
        *slot = state;
    }
}

/// Map a credential-exchange rejection onto [`ApiError::InvalidCredentials`].
///
/// The server reports bad credentials as a `400` with a detail payload;
/// some deployments answer `401` or `403` instead. All three mean the same
/// thing to the caller. Transport-level failures pass through untouched.
fn reject_credentials(e: ApiError) -> ApiError {
    match e {
        ApiError::ValidationFailed { detail } => ApiError::InvalidCredentials { detail },
        ApiError::AuthenticationRequired | ApiError::PermissionDenied(_) => {
            ApiError::InvalidCredentials {
                detail: "the server rejected the credentials".to_string(),
            }
        }
        other => other,
    }
}
