//! Session lifecycle commands: login, registration, logout, restore.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{User, UserCreate, UserRole};

use super::store::{AuthState, Session, SessionStore};

/// Minimum accepted password length for new accounts
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Rejected locally, before any request was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Another login or registration is already in flight.
    #[error("An authentication attempt is already in flight")]
    Busy,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Minimal shape check: no whitespace, one '@' with characters on both
/// sides, and an interior dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    if email.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Everything collected by the signup form.
///
/// `password_confirmation` and `accept_terms` are checked locally and
/// never transmitted. `document` only applies to carpenter accounts.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: UserRole,
    pub document: Option<String>,
    pub accept_terms: bool,
}

impl Registration {
    fn validate(&self) -> Result<(), AuthError> {
        for (field, value) in [("name", &self.name), ("phone", &self.phone)] {
            if value.trim().is_empty() {
                return Err(AuthError::Validation(format!("{field} is required")));
            }
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(AuthError::Validation(
                "email address is not well-formed".to_string(),
            ));
        }
        if self.password != self.password_confirmation {
            return Err(AuthError::Validation("passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "password must have at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if !self.accept_terms {
            return Err(AuthError::Validation(
                "the terms of use must be accepted".to_string(),
            ));
        }
        Ok(())
    }

    /// Wire payload: confirmation and terms stay local, and the document
    /// travels only for carpenters, trimmed, with empty meaning absent.
    fn to_create(&self) -> UserCreate {
        let document = match self.role {
            UserRole::Carpenter => self
                .document
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            _ => None,
        };
        UserCreate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            document,
        }
    }
}

/// Single source of truth for "who is logged in".
///
/// Construct one at startup, call [`SessionManager::restore_session`],
/// and hand clones to whatever needs it - all clones share the same
/// state. Login and registration are serialized by an internal gate: a
/// second attempt while one is in flight fails with [`AuthError::Busy`],
/// and a logout issued during one waits for it, so the machine always
/// lands `Unauthenticated` after a logout.
#[derive(Clone)]
pub struct SessionManager {
    client: ApiClient,
    store: SessionStore,
    auth_gate: Arc<Mutex<()>>,
}

impl SessionManager {
    pub fn new(client: ApiClient, store: SessionStore) -> Self {
        Self {
            client,
            store,
            auth_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Bring back the persisted session, if a valid pair is on disk.
    ///
    /// No network round trip happens here; a token the server has since
    /// expired surfaces as `Unauthorized` on the first real call, which
    /// tears the session down through the store.
    pub fn restore_session(&self) -> bool {
        let restored = self.store.restore();
        if restored {
            info!("session restored from disk");
        }
        restored
    }

    /// Authenticate against the remote service.
    ///
    /// Local preconditions (plausible email, non-empty password) fail as
    /// `Validation` without touching the network or the current state.
    /// Any failure after that leaves the machine `Unauthenticated`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if !is_plausible_email(email.trim()) {
            return Err(AuthError::Validation(
                "email address is not well-formed".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        let _gate = self.auth_gate.try_lock().map_err(|_| AuthError::Busy)?;
        self.store.broadcast(AuthState::Authenticating);

        match self.client.login(email.trim(), password).await {
            Ok(session) => self.install(session.token, session.user),
            Err(ApiError::Unauthorized) => {
                debug!("credentials rejected");
                self.store.clear();
                Err(AuthError::InvalidCredentials)
            }
            Err(err) => {
                self.store.clear();
                Err(err.into())
            }
        }
    }

    /// Open an account, then establish a session for it.
    ///
    /// When the creation response already carries a token it is used
    /// directly; otherwise the manager logs in with the submitted
    /// credentials.
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        registration.validate()?;

        let _gate = self.auth_gate.try_lock().map_err(|_| AuthError::Busy)?;
        self.store.broadcast(AuthState::Authenticating);

        let payload = registration.to_create();
        let created = match self.client.create_user(&payload).await {
            Ok(created) => created,
            Err(err) => {
                self.store.clear();
                return Err(err.into());
            }
        };

        match created.token {
            Some(token) => self.install(token, created.user),
            None => match self
                .client
                .login(&payload.email, &registration.password)
                .await
            {
                Ok(session) => self.install(session.token, session.user),
                Err(err) => {
                    warn!("account created but the follow-up login failed");
                    self.store.clear();
                    Err(match err {
                        ApiError::Unauthorized => AuthError::InvalidCredentials,
                        other => other.into(),
                    })
                }
            },
        }
    }

    /// Drop the session. Idempotent and infallible; never touches the
    /// network. Waits for any in-flight login or registration first.
    pub async fn logout(&self) {
        let _gate = self.auth_gate.lock().await;
        self.store.clear();
        info!("logged out");
    }

    fn install(&self, token: String, user: User) -> Result<User, AuthError> {
        if let Err(err) = self.store.set(Session {
            token,
            user: user.clone(),
        }) {
            // The in-memory session is live; it just won't survive a
            // restart.
            warn!(%err, "session persisted incompletely");
        }
        info!(email = %user.email, "authenticated");
        Ok(user)
    }

    /// Account of the current session, if one is held.
    pub fn current_user(&self) -> Option<User> {
        self.store.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Follow the login state machine reactively.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> Registration {
        Registration {
            name: "Ana Souza".into(),
            email: "ana@example.com".into(),
            phone: "+55 11 98765-4321".into(),
            password: "segredo".into(),
            password_confirmation: "segredo".into(),
            role: UserRole::Client,
            document: None,
            accept_terms: true,
        }
    }

    fn manager_against(base_url: &str) -> (tempfile::TempDir, SessionManager) {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let store = SessionStore::open(dir.path().to_path_buf()).expect("open store");
        let client = ApiClient::new(base_url, store.clone()).expect("client");
        (dir, SessionManager::new(client, store))
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("ana@example.com"));
        assert!(is_plausible_email("a.b+c@sub.example.com.br"));
        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("ana"));
        assert!(!is_plausible_email("ana@"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ana@example"));
        assert!(!is_plausible_email("ana@.com"));
        assert!(!is_plausible_email("ana @example.com"));
    }

    #[test]
    fn test_registration_validation() {
        assert!(valid_registration().validate().is_ok());

        let mut reg = valid_registration();
        reg.name = "   ".into();
        assert!(matches!(reg.validate(), Err(AuthError::Validation(msg)) if msg.contains("name")));

        let mut reg = valid_registration();
        reg.email = "ana".into();
        assert!(matches!(reg.validate(), Err(AuthError::Validation(msg)) if msg.contains("email")));

        let mut reg = valid_registration();
        reg.password_confirmation = "segred0".into();
        assert!(matches!(reg.validate(), Err(AuthError::Validation(msg)) if msg.contains("match")));

        let mut reg = valid_registration();
        reg.password = "abc".into();
        reg.password_confirmation = "abc".into();
        assert!(
            matches!(reg.validate(), Err(AuthError::Validation(msg)) if msg.contains("at least"))
        );

        let mut reg = valid_registration();
        reg.accept_terms = false;
        assert!(matches!(reg.validate(), Err(AuthError::Validation(msg)) if msg.contains("terms")));
    }

    #[test]
    fn test_mismatch_is_reported_before_length() {
        let mut reg = valid_registration();
        reg.password = "abc".into();
        reg.password_confirmation = "abd".into();
        assert!(matches!(reg.validate(), Err(AuthError::Validation(msg)) if msg.contains("match")));
    }

    #[test]
    fn test_document_travels_only_for_carpenters() {
        let mut reg = valid_registration();
        reg.role = UserRole::Carpenter;
        reg.document = Some("  CR-1234  ".into());
        assert_eq!(reg.to_create().document.as_deref(), Some("CR-1234"));

        reg.document = Some("   ".into());
        assert_eq!(reg.to_create().document, None);

        reg.role = UserRole::Client;
        reg.document = Some("CR-1234".into());
        assert_eq!(reg.to_create().document, None);
    }

    #[test]
    fn test_wire_payload_is_trimmed() {
        let mut reg = valid_registration();
        reg.name = "  Ana Souza ".into();
        reg.email = " ana@example.com ".into();
        let payload = reg.to_create();
        assert_eq!(payload.name, "Ana Souza");
        assert_eq!(payload.email, "ana@example.com");
        assert!(payload.validate().is_ok());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email_without_network() {
        // Unroutable base URL: reaching the network would fail with a
        // different kind.
        let (_dir, manager) = manager_against("http://127.0.0.1:9");
        let err = manager.login("ana", "segredo").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_rejects_empty_password_without_network() {
        let (_dir, manager) = manager_against("http://127.0.0.1:9");
        let err = manager.login("ana@example.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password_without_network() {
        let (_dir, manager) = manager_against("http://127.0.0.1:9");
        let mut reg = valid_registration();
        reg.password = "abc".into();
        reg.password_confirmation = "abc".into();
        let err = manager.register(&reg).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
