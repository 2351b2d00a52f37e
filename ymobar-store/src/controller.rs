//! Session controller.
//!
//! Owns one portal session and publishes an observable [`ViewState`] for the
//! presentation layer. Intents (login, refresh, logout, auto-login) are
//! serialized: while one runs, any other returns [`SessionError::Busy`]
//! immediately and leaves the state alone.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};
use ymobar_core::{LoginOrigin, SessionCredentials, UsageSnapshot};
use ymobar_fetch::{SessionError, UsagePortal, fetch_with_recovery};

use crate::credentials::CredentialStore;
use crate::error::StoreError;

/// User-facing error messages.
pub mod messages {
    /// Stored credentials were refused.
    pub const AUTO_LOGIN_FAILED: &str = "Automatic login failed";
    /// Typed credentials were refused.
    pub const LOGIN_FAILED: &str = "Login failed. Check your ID and password.";
    /// Prefix for network failures during login.
    pub const UNREACHABLE: &str = "Could not reach the portal";
    /// Prefix for failed fetches.
    pub const FETCH_FAILED: &str = "Failed to fetch usage data";
    /// Prefix for a credential store that refused to remember a login.
    pub const REMEMBER_FAILED: &str = "Logged in, but the credentials were not remembered";
}

// ============================================================================
// View State
// ============================================================================

/// What the presentation layer shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// An intent is running.
    pub is_loading: bool,
    /// Message of the last failure, cleared when a login starts or a fetch
    /// succeeds.
    pub error: Option<String>,
    /// Last successfully fetched usage. Survives failed refreshes.
    pub data: Option<UsageSnapshot>,
    /// The portal accepted a login in this session.
    pub is_logged_in: bool,
    /// Automatic login has been tried.
    pub auto_login_attempted: bool,
}

// ============================================================================
// Controller
// ============================================================================

/// Drives a portal session on behalf of the presentation layer.
pub struct SessionController {
    portal: Arc<dyn UsagePortal>,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<ViewState>,
    /// Held for the duration of an intent. Holds the credentials of the
    /// current login, used for relogin when nothing is remembered.
    session: Mutex<Option<SessionCredentials>>,
}

impl SessionController {
    /// Creates a controller with a fresh view state.
    pub fn new(portal: Arc<dyn UsagePortal>, store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            portal,
            store,
            state,
            session: Mutex::new(None),
        }
    }

    /// Current view state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Subscribes to view state changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Logs in with typed credentials, then fetches usage.
    ///
    /// Credentials are remembered only when `remember` is set and the portal
    /// accepted them. If the credential store refuses them, the login still
    /// succeeds and the view state carries [`messages::REMEMBER_FAILED`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] if another intent is running, the login
    /// error if the portal refused or could not be reached, and the fetch
    /// error otherwise.
    #[instrument(skip_all, name = "controller_login")]
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        remember: bool,
    ) -> Result<UsageSnapshot, SessionError> {
        let mut session = self.session.try_lock().map_err(|_| SessionError::Busy)?;
        let credentials = SessionCredentials::new(identifier, secret);
        self.login_locked(&mut session, credentials, LoginOrigin::User, remember)
            .await
    }

    /// Fetches usage, relogging in once if the session expired.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] if another intent is running, and the
    /// fetch error otherwise. The previous data stays in the view state.
    #[instrument(skip_all, name = "controller_refresh")]
    pub async fn refresh(&self) -> Result<UsageSnapshot, SessionError> {
        let session = self.session.try_lock().map_err(|_| SessionError::Busy)?;
        let _loading = self.begin_loading();
        self.fetch_locked(session.as_ref()).await
    }

    /// Logs in with remembered credentials, if there are any.
    ///
    /// Returns `Ok(None)` when nothing is remembered.
    ///
    /// # Errors
    ///
    /// Same as [`SessionController::login`].
    #[instrument(skip_all, name = "controller_auto_login")]
    pub async fn auto_login(&self) -> Result<Option<UsageSnapshot>, SessionError> {
        let mut session = self.session.try_lock().map_err(|_| SessionError::Busy)?;
        self.state.send_modify(|s| s.auto_login_attempted = true);

        let Some(credentials) = self.store.load() else {
            debug!("No remembered credentials");
            return Ok(None);
        };

        self.login_locked(&mut session, credentials, LoginOrigin::Automatic, false)
            .await
            .map(Some)
    }

    /// Forgets everything: remembered credentials, session cookies and the
    /// view state.
    ///
    /// The session and view state are reset even if the credential store
    /// fails to clear.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Session`] with [`SessionError::Busy`] if another
    /// intent is running, or the credential store's error.
    #[instrument(skip_all, name = "controller_logout")]
    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut session = self.session.try_lock().map_err(|_| SessionError::Busy)?;

        let cleared = self.store.clear();
        if let Err(e) = &cleared {
            warn!(error = %e, "Failed to clear remembered credentials");
        }
        *session = None;
        self.portal.logout();
        self.state.send_replace(ViewState::default());

        info!("Logged out");
        cleared
    }

    // ========================================================================
    // Locked Steps
    // ========================================================================

    /// Marks the view state as loading until the returned guard drops.
    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|s| s.is_loading = true);
        LoadingGuard(&self.state)
    }

    async fn login_locked(
        &self,
        session: &mut Option<SessionCredentials>,
        credentials: SessionCredentials,
        origin: LoginOrigin,
        remember: bool,
    ) -> Result<UsageSnapshot, SessionError> {
        let _loading = self.begin_loading();
        self.state.send_modify(|s| s.error = None);

        if let Err(e) = self.portal.login(&credentials).await {
            warn!(error = %e, automatic = origin.is_automatic(), "Login failed");
            *session = None;
            let message = login_failure_message(&e, origin);
            self.state.send_modify(|s| {
                s.is_loading = false;
                s.is_logged_in = false;
                s.auto_login_attempted = true;
                s.error = Some(message);
            });
            return Err(e);
        }

        info!(automatic = origin.is_automatic(), "Logged in");
        let remembered = if remember {
            let saved = self.store.save(&credentials.identifier, &credentials.secret);
            match &saved {
                Ok(()) => debug!("Credentials remembered"),
                Err(e) => warn!(error = %e, "Failed to remember credentials"),
            }
            saved
        } else {
            Ok(())
        };

        *session = Some(credentials);
        self.state.send_modify(|s| {
            s.is_logged_in = true;
            s.auto_login_attempted = true;
        });
        let snapshot = self.fetch_locked(session.as_ref()).await?;

        if let Err(e) = remembered {
            self.state.send_modify(|s| {
                s.error = Some(format!("{}: {e}", messages::REMEMBER_FAILED));
            });
        }
        Ok(snapshot)
    }

    async fn fetch_locked(
        &self,
        current: Option<&SessionCredentials>,
    ) -> Result<UsageSnapshot, SessionError> {
        let credentials = current.cloned().or_else(|| self.store.load());

        match fetch_with_recovery(&*self.portal, credentials.as_ref()).await {
            Ok(snapshot) => {
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.error = None;
                    s.is_logged_in = true;
                    s.data = Some(snapshot.clone());
                });
                Ok(snapshot)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.error = Some(format!("{}: {e}", messages::FETCH_FAILED));
                });
                Err(e)
            }
        }
    }
}

/// Clears `is_loading` when an intent ends, including when its future is
/// dropped mid-flow.
struct LoadingGuard<'a>(&'a watch::Sender<ViewState>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0
            .send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
    }
}

fn login_failure_message(error: &SessionError, origin: LoginOrigin) -> String {
    match error {
        SessionError::Transport(cause) => format!("{}: {cause}", messages::UNREACHABLE),
        _ if origin.is_automatic() => messages::AUTO_LOGIN_FAILED.to_string(),
        _ => messages::LOGIN_FAILED.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
