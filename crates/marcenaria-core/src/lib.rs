//! Client core for the Five Marcenaria marketplace.
//!
//! Five Marcenaria connects clients, sales agents and carpenters around
//! custom furniture projects. This crate is the piece every front end
//! shares: a typed client for the platform's REST API and the session
//! lifecycle around it.
//!
//! - [`ApiClient`]: authenticated, typed access to the resource groups
//!   (users, budget requests, visits, bids, addresses)
//! - [`SessionManager`]: login, registration, logout and restore of the
//!   persisted session
//! - [`models`]: wire records and request payloads
//!
//! The crate installs no logging subscriber and no request timeouts;
//! both belong to the consuming application.
//!
//! ```no_run
//! use marcenaria_core::{ApiClient, Config, SessionManager, SessionStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let store = SessionStore::open(config.session_dir()?)?;
//! let client = ApiClient::new(&config.api_base_url, store.clone())?;
//! let manager = SessionManager::new(client.clone(), store);
//!
//! manager.restore_session();
//! if !manager.is_authenticated() {
//!     manager.login("ana@example.com", "segredo").await?;
//! }
//! let open_requests = client.list_budget_requests().await?;
//! println!("{} requests", open_requests.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthSession, RegisteredUser};
pub use auth::{AuthError, AuthState, Registration, Session, SessionManager, SessionStore};
pub use config::Config;
pub use models::{
    Address, AddressCreate, AddressUpdate, Bid, BidCreate, BidStatus, BidUpdate, BudgetRequest,
    BudgetRequestCreate, BudgetRequestUpdate, BudgetStatus, User, UserCreate, UserRole, UserUpdate,
    Visit, VisitCreate, VisitStatus, VisitUpdate,
};
