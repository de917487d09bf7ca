//! Data models for Five Marcenaria entities.
//!
//! This module contains all the data structures exchanged with the
//! marketplace API:
//!
//! - `User`, `UserRole`: accounts and their marketplace role
//! - `BudgetRequest`, `BudgetStatus`: a client's quote request lifecycle
//! - `Visit`, `VisitStatus`: seller measurement visits
//! - `Bid`, `BidStatus`: carpenter offers
//! - `Address`: registered locations
//!
//! Each resource also has a creation payload (`*Create`, validated before
//! transmission) and a partial-update payload (`*Update`, serializing only
//! the fields that are set).

pub mod address;
pub mod bid;
pub mod budget_request;
pub mod user;
pub mod visit;

pub use address::{Address, AddressCreate, AddressUpdate};
pub use bid::{Bid, BidCreate, BidStatus, BidUpdate};
pub use budget_request::{BudgetRequest, BudgetRequestCreate, BudgetRequestUpdate, BudgetStatus};
pub use user::{User, UserCreate, UserRole, UserUpdate};
pub use visit::{Visit, VisitCreate, VisitStatus, VisitUpdate};
