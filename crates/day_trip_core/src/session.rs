//! crates/day_trip_core/src/session.rs
//!
//! The session gate: a two-state machine (anonymous / authenticated) that
//! owns the credential, keeps the header's session control in sync and
//! decides whether booking actions may proceed.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::{Credential, User};
use crate::ports::{BackendGateway, CredentialStore, PortError, PortResult, RenderSink};
use crate::render::{HeaderControl, LoginForm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Credential),
}

impl SessionState {
    fn header(&self) -> HeaderControl {
        match self {
            SessionState::Anonymous => HeaderControl::Login,
            SessionState::Authenticated(_) => HeaderControl::Logout,
        }
    }
}

struct Inner {
    state: SessionState,
    user: Option<User>,
}

pub struct SessionGate {
    gateway: Arc<dyn BackendGateway>,
    store: Arc<dyn CredentialStore>,
    sink: Arc<dyn RenderSink>,
    inner: Mutex<Inner>,
}

impl SessionGate {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        store: Arc<dyn CredentialStore>,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            gateway,
            store,
            sink,
            inner: Mutex::new(Inner {
                state: SessionState::Anonymous,
                user: None,
            }),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    /// Rebuilds the session from the persisted credential at page load.
    ///
    /// A credential the backend rejects is cleared. One that could not be
    /// checked (network failure) is kept for the next page load, but the
    /// session starts anonymous.
    pub async fn restore(&self) -> SessionState {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Could not read the stored credential: {:?}", e);
                None
            }
        };

        let (state, user) = match stored {
            None => (SessionState::Anonymous, None),
            Some(credential) => match self.gateway.current_user(&credential).await {
                Ok(user) => {
                    info!(user_id = user.id, "Session restored.");
                    (SessionState::Authenticated(credential), Some(user))
                }
                Err(PortError::Unauthorized) => {
                    info!("Stored credential was rejected; clearing it.");
                    self.clear_store();
                    (SessionState::Anonymous, None)
                }
                Err(e) => {
                    error!("Could not verify the stored credential: {:?}", e);
                    (SessionState::Anonymous, None)
                }
            },
        };

        let mut inner = self.inner.lock().await;
        inner.state = state.clone();
        inner.user = user;
        self.sink.set_header(state.header());
        state
    }

    /// Exchanges email and password for a credential.
    ///
    /// Failure leaves the state, and any stored credential, untouched.
    pub async fn login(&self, email: &str, password: &str) -> PortResult<()> {
        let (email, password) = (email.trim(), password.trim());
        if email.is_empty() || password.is_empty() {
            let e = PortError::Validation("Please enter your email and password".to_string());
            self.sink.show_form_message(LoginForm::Login, &e.user_message());
            return Err(e);
        }

        let credential = match self.gateway.login(email, password).await {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Login failed: {:?}", e);
                let message = match &e {
                    PortError::Unauthorized => "Wrong email or password".to_string(),
                    other => other.user_message(),
                };
                self.sink.show_form_message(LoginForm::Login, &message);
                return Err(e);
            }
        };

        if let Err(e) = self.store.save(&credential) {
            error!("Failed to persist the credential: {:?}", e);
        }

        let mut inner = self.inner.lock().await;
        let was_anonymous = inner.state == SessionState::Anonymous;
        inner.state = SessionState::Authenticated(credential);
        inner.user = None;
        self.sink.close_login_prompt();
        if was_anonymous {
            self.sink.set_header(HeaderControl::Logout);
        }
        info!("Signed in.");
        Ok(())
    }

    /// Registers a new account. On success the prompt switches back to the login form.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> PortResult<()> {
        let (name, email, password) = (name.trim(), email.trim(), password.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            let e = PortError::Validation("Please fill in every field".to_string());
            self.sink.show_form_message(LoginForm::Signup, &e.user_message());
            return Err(e);
        }

        match self.gateway.signup(name, email, password).await {
            Ok(()) => {
                info!("Account registered.");
                self.sink
                    .show_form_message(LoginForm::Login, "Registered, please sign in");
                Ok(())
            }
            Err(e) => {
                warn!("Signup failed: {:?}", e);
                self.sink.show_form_message(LoginForm::Signup, &e.user_message());
                Err(e)
            }
        }
    }

    /// Signs out on explicit user action.
    pub async fn logout(&self) {
        let credential = match self.state().await {
            SessionState::Authenticated(credential) => credential,
            SessionState::Anonymous => return,
        };
        if let Err(e) = self.gateway.logout(&credential).await {
            warn!("Backend logout failed, clearing locally anyway: {:?}", e);
        }
        self.demote().await;
        info!("Signed out.");
    }

    /// Handles the backend rejecting the credential on an authenticated call.
    pub async fn reject(&self) {
        warn!("Credential rejected by the backend.");
        self.demote().await;
        self.sink.open_login_prompt();
    }

    /// Returns the credential for a booking action, or opens the login
    /// prompt instead. The intercepted action is not replayed after login.
    pub async fn guard(&self) -> Option<Credential> {
        match self.state().await {
            SessionState::Authenticated(credential) => Some(credential),
            SessionState::Anonymous => {
                self.sink.open_login_prompt();
                None
            }
        }
    }

    /// The signed-in user's profile, fetched on first use.
    pub async fn profile(&self) -> Option<User> {
        let credential = {
            let inner = self.inner.lock().await;
            if inner.user.is_some() {
                return inner.user.clone();
            }
            match &inner.state {
                SessionState::Authenticated(credential) => credential.clone(),
                SessionState::Anonymous => return None,
            }
        };

        match self.gateway.current_user(&credential).await {
            Ok(user) => {
                let mut inner = self.inner.lock().await;
                if inner.state == SessionState::Authenticated(credential) {
                    inner.user = Some(user.clone());
                }
                Some(user)
            }
            Err(PortError::Unauthorized) => {
                self.reject().await;
                None
            }
            Err(e) => {
                error!("Failed to fetch the user profile: {:?}", e);
                None
            }
        }
    }

    async fn demote(&self) {
        self.clear_store();
        let mut inner = self.inner.lock().await;
        let was_authenticated = inner.state != SessionState::Anonymous;
        inner.state = SessionState::Anonymous;
        inner.user = None;
        if was_authenticated {
            self.sink.set_header(HeaderControl::Login);
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            error!("Failed to clear the stored credential: {:?}", e);
        }
    }
}
