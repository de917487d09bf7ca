//! REST API client module for the Five Marcenaria service.
//!
//! This module provides the `ApiClient` for communicating with the
//! marketplace API: accounts, budget requests, visits, bids and
//! addresses.
//!
//! The API uses JWT bearer token authentication obtained through
//! `POST /auth/login`; the token travels on every subsequent request.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthSession, RegisteredUser};
pub use error::ApiError;
