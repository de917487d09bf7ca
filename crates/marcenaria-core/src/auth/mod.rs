//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the durable token/user pair plus the reactive
//!   login state channel
//! - `SessionManager`: login, registration, logout and restore commands
//!
//! Sessions are persisted to the session directory as two files (token
//! and cached user record) and only count when both are present.

pub mod session;
pub mod store;

pub use session::{AuthError, Registration, SessionManager};
pub use store::{AuthState, Session, SessionStore};
