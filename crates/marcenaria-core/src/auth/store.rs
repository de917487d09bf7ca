//! Shared session state: the persisted token/user pair and the reactive
//! login state channel.
//!
//! The [`SessionStore`] is cloned into both the session manager (its only
//! writer for normal transitions) and the API client (which reads the
//! token per request and forces invalidation when the server rejects it).

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::User;

/// Token file name in the session directory
const TOKEN_FILE: &str = "jwt_token";

/// Cached user record file name in the session directory
const USER_FILE: &str = "user.json";

/// An authenticated session: the bearer token and the account it belongs
/// to. The two always travel together; there is no half-session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Read model for the login state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    /// A login or registration is in flight.
    Authenticating,
    Authenticated(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Bearer tokens must survive an HTTP header round trip, so anything
/// outside printable ASCII marks the persisted entry as corrupt.
fn is_plausible_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_graphic())
}

/// Holder of the current session, shared by manager and API client.
/// Clone is cheap - every clone points at the same state and channel.
#[derive(Clone)]
pub struct SessionStore {
    dir: PathBuf,
    current: Arc<RwLock<Option<Session>>>,
    state_tx: Arc<watch::Sender<AuthState>>,
}

impl SessionStore {
    /// Open the session directory, creating it if needed.
    pub fn open(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;
        let (state_tx, _) = watch::channel(AuthState::Unauthenticated);
        Ok(Self {
            dir,
            current: Arc::new(RwLock::new(None)),
            state_tx: Arc::new(state_tx),
        })
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }

    fn snapshot(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace(&self, value: Option<Session>) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }

    /// Current session, if one is held.
    pub fn session(&self) -> Option<Session> {
        self.snapshot()
    }

    /// Bearer token of the current session.
    pub fn token(&self) -> Option<String> {
        self.snapshot().map(|s| s.token)
    }

    /// Cached account of the current session.
    pub fn user(&self) -> Option<User> {
        self.snapshot().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Follow the login state machine. The receiver yields the current
    /// state immediately and every transition afterwards.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn broadcast(&self, state: AuthState) {
        self.state_tx.send_replace(state);
    }

    /// Install a session: in-memory state first, then the durable pair.
    /// The session is live even when the disk write fails; the error is
    /// returned so the caller can log it.
    pub(crate) fn set(&self, session: Session) -> Result<()> {
        self.replace(Some(session.clone()));
        self.broadcast(AuthState::Authenticated(session.user.clone()));
        self.persist(&session)
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let user_json = serde_json::to_string_pretty(&session.user)
            .context("Failed to serialize user record")?;
        std::fs::write(self.token_path(), &session.token)
            .context("Failed to write session token")?;
        std::fs::write(self.user_path(), user_json)
            .context("Failed to write cached user record")?;
        Ok(())
    }

    /// Drop the session everywhere. Idempotent; IO failures are logged
    /// and swallowed so teardown can never fail.
    pub fn clear(&self) {
        self.replace(None);
        self.broadcast(AuthState::Unauthenticated);
        for path in [self.token_path(), self.user_path()] {
            if let Err(err) = std::fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), %err, "Failed to remove session file");
                }
            }
        }
    }

    /// Forced teardown, driven by the API layer observing a 401.
    pub(crate) fn invalidate(&self) {
        self.clear();
    }

    fn read_pair(&self) -> Result<Session> {
        let token = std::fs::read_to_string(self.token_path())
            .context("Failed to read session token")?;
        let token = token.trim().to_string();
        if !is_plausible_token(&token) {
            anyhow::bail!("Persisted token is not a plausible bearer token");
        }
        let user_json = std::fs::read_to_string(self.user_path())
            .context("Failed to read cached user record")?;
        let user: User =
            serde_json::from_str(&user_json).context("Failed to parse cached user record")?;
        Ok(Session { token, user })
    }

    /// Load the persisted pair into memory, announcing the result. Both
    /// entries must be present and structurally valid; anything else is
    /// treated as no session and the leftovers are removed.
    pub(crate) fn restore(&self) -> bool {
        let token_exists = self.token_path().exists();
        let user_exists = self.user_path().exists();
        if !token_exists || !user_exists {
            if token_exists || user_exists {
                // A lone entry is an interrupted write.
                warn!("Incomplete session pair on disk, discarding");
                self.clear();
            } else {
                debug!("No persisted session");
            }
            return false;
        }
        match self.read_pair() {
            Ok(session) => {
                let user = session.user.clone();
                self.replace(Some(session));
                self.broadcast(AuthState::Authenticated(user));
                true
            }
            Err(err) => {
                warn!(%err, "Persisted session is unusable, discarding");
                self.clear();
                false
            }
        }
    }
}
