use secrecy::SecretString;
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;

pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Observable lifecycle of the in-memory session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    /// Reissue failed. Consumers should send the user back to `login_path`.
    Expired { login_path: String },
}

/// Holds the single bearer token for the process.
///
/// The token lives in memory only. It is replaced on login and on every
/// successful reissue, and cleared on logout or when a reissue fails.
pub struct Session {
    token: RwLock<Option<SecretString>>,
    state: watch::Sender<SessionState>,
    login_path: String,
}

impl Session {
    pub fn new() -> Self {
        Self::with_login_path(DEFAULT_LOGIN_PATH)
    }

    pub fn with_login_path(login_path: impl Into<String>) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            token: RwLock::new(None),
            state,
            login_path: login_path.into(),
        }
    }

    pub fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn set_token(&self, token: SecretString) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        self.state.send_replace(SessionState::Authenticated);
    }

    /// Forget the token after an explicit logout
    pub fn clear(&self) {
        self.take_token();
        self.state.send_replace(SessionState::Anonymous);
        tracing::info!("Session cleared");
    }

    /// Forget the token and publish the session-loss signal
    pub fn expire(&self) {
        self.take_token();
        self.state.send_replace(SessionState::Expired {
            login_path: self.login_path.clone(),
        });
        tracing::warn!(login_path = %self.login_path, "Session expired");
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    fn take_token(&self) {
        self.token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_token", &self.has_token())
            .field("state", &self.state())
            .finish()
    }
}
