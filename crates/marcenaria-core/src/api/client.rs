//! API client for communicating with the Five Marcenaria REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the marketplace service: users, budget requests,
//! visits, bids and addresses, plus the credential endpoints.
//!
//! Every request picks up the bearer token from the shared `SessionStore`
//! at send time. A 401 on a session-authenticated call invalidates that
//! store (dropping the persisted session) before the error is surfaced;
//! the credential endpoints go through a separate path so a rejected
//! login cannot tear down an existing session.

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::models::{
    Address, AddressCreate, AddressUpdate, Bid, BidCreate, BidUpdate, BudgetRequest,
    BudgetRequestCreate, BudgetRequestUpdate, BudgetStatus, User, UserCreate, UserRole, UserUpdate,
    Visit, VisitCreate, VisitUpdate,
};

use super::ApiError;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Token and account pair returned by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Outcome of account creation. Some deployments open a session right
/// away and return `{token, user}`; others return the bare user record.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user: User,
    pub token: Option<String>,
}

impl RegisteredUser {
    /// Try the session shape first, then fall back to a plain user record.
    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if let Ok(session) = serde_json::from_str::<AuthSession>(body) {
            return Ok(RegisteredUser {
                user: session.user,
                token: Some(session.token),
            });
        }
        let user: User = serde_json::from_str(body)?;
        Ok(RegisteredUser { user, token: None })
    }
}

/// API client for the Five Marcenaria service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: SessionStore,
}

impl ApiClient {
    /// Create a client against `base_url`, reading bearer tokens from
    /// `store`. No request timeout is installed; timeout policy belongs
    /// to the caller.
    pub fn new(base_url: &str, store: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a request with the bearer token attached when one is held.
    /// Requests never wait for a token; without one the header is absent.
    fn prepare(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, self.endpoint(path));
        if let Some(token) = self.store.token() {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Send a session-authenticated request. A 401 means the session is
    /// no longer valid server-side: the shared store is invalidated
    /// before the error is returned.
    async fn dispatch(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "server rejected the session token, dropping local session");
            self.store.invalidate();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(path, status = status.as_u16(), "request failed");
            return Err(ApiError::from_status(status, &body));
        }
        Ok(response)
    }

    /// Same checks as `dispatch`, but a 401 is surfaced without touching
    /// the session store: on the credential endpoints it means the
    /// submitted credentials were rejected, not the current session.
    async fn dispatch_credentials(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(path, status = status.as_u16(), "credential request failed");
            return Err(ApiError::from_status(status, &body));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            warn!(%err, "response body did not match the expected shape");
            ApiError::malformed(status, &err)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(path, self.prepare(Method::GET, path)).await?;
        Self::read_json(response).await
    }

    async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = self.prepare(Method::GET, path).query(query);
        let response = self.dispatch(path, request).await?;
        Self::read_json(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.prepare(Method::POST, path).json(body);
        let response = self.dispatch(path, request).await?;
        Self::read_json(response).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.prepare(Method::PUT, path).json(body);
        let response = self.dispatch(path, request).await?;
        Self::read_json(response).await
    }

    async fn patch_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = self.prepare(Method::PATCH, path).query(query);
        let response = self.dispatch(path, request).await?;
        Self::read_json(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(path, self.prepare(Method::DELETE, path))
            .await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange credentials for a token and user pair (POST /auth/login).
    ///
    /// A 401 here surfaces as `Unauthorized` but leaves the current
    /// session untouched; the caller decides what it means.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        debug!(email, "logging in");
        let request = self
            .prepare(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let response = self.dispatch_credentials("/auth/login", request).await?;
        Self::read_json(response).await
    }

    /// Create an account (POST /users). The payload is checked locally
    /// first; nothing is transmitted when a required field is missing.
    pub async fn create_user(&self, user: &UserCreate) -> Result<RegisteredUser, ApiError> {
        user.validate().map_err(ApiError::validation)?;
        debug!(email = %user.email, "creating account");
        let request = self.prepare(Method::POST, "/users").json(user);
        let response = self.dispatch_credentials("/users", request).await?;
        let status = response.status();
        let body = response.text().await?;
        RegisteredUser::from_body(&body).map_err(|err| {
            warn!(%err, "registration response did not match either known shape");
            ApiError::malformed(status, &err)
        })
    }

    /// Fetch the account behind the current token (GET /users/me).
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/users/me").await
    }

    // ===== Users =====

    pub async fn user_by_id(&self, id: i64) -> Result<User, ApiError> {
        self.get(&format!("/users/{id}")).await
    }

    /// List accounts, optionally narrowed to one role.
    pub async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, ApiError> {
        match role {
            Some(role) => self.get_query("/users", &[("userType", role.as_str())]).await,
            None => self.get("/users").await,
        }
    }

    pub async fn update_user(&self, id: i64, changes: &UserUpdate) -> Result<User, ApiError> {
        self.put(&format!("/users/{id}"), changes).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/users/{id}")).await
    }

    // ===== Budget requests =====

    pub async fn create_budget_request(
        &self,
        request: &BudgetRequestCreate,
    ) -> Result<BudgetRequest, ApiError> {
        request.validate().map_err(ApiError::validation)?;
        self.post("/budget-requests", request).await
    }

    pub async fn budget_request_by_id(&self, id: i64) -> Result<BudgetRequest, ApiError> {
        self.get(&format!("/budget-requests/{id}")).await
    }

    pub async fn list_budget_requests(&self) -> Result<Vec<BudgetRequest>, ApiError> {
        self.get("/budget-requests").await
    }

    /// All requests published by one client.
    pub async fn budget_requests_by_client(
        &self,
        client_id: i64,
    ) -> Result<Vec<BudgetRequest>, ApiError> {
        self.get(&format!("/budget-requests/client/{client_id}"))
            .await
    }

    pub async fn budget_requests_by_status(
        &self,
        status: BudgetStatus,
    ) -> Result<Vec<BudgetRequest>, ApiError> {
        self.get(&format!("/budget-requests/status/{}", status.as_str()))
            .await
    }

    /// Requests whose location matches a city/state pair.
    pub async fn budget_requests_by_location(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Vec<BudgetRequest>, ApiError> {
        self.get_query(
            "/budget-requests/location",
            &[("city", city), ("state", state)],
        )
        .await
    }

    pub async fn update_budget_request(
        &self,
        id: i64,
        changes: &BudgetRequestUpdate,
    ) -> Result<BudgetRequest, ApiError> {
        self.put(&format!("/budget-requests/{id}"), changes).await
    }

    /// Move a request through its lifecycle (PATCH with a query
    /// parameter, the way the service models status transitions).
    pub async fn update_budget_request_status(
        &self,
        id: i64,
        status: BudgetStatus,
    ) -> Result<BudgetRequest, ApiError> {
        self.patch_with_query(
            &format!("/budget-requests/{id}/status"),
            &[("status", status.as_str())],
        )
        .await
    }

    pub async fn delete_budget_request(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/budget-requests/{id}")).await
    }

    // ===== Visits =====

    pub async fn create_visit(&self, visit: &VisitCreate) -> Result<Visit, ApiError> {
        visit.validate().map_err(ApiError::validation)?;
        self.post("/visits", visit).await
    }

    pub async fn visit_by_id(&self, id: i64) -> Result<Visit, ApiError> {
        self.get(&format!("/visits/{id}")).await
    }

    pub async fn list_visits(&self) -> Result<Vec<Visit>, ApiError> {
        self.get("/visits").await
    }

    pub async fn update_visit(&self, id: i64, changes: &VisitUpdate) -> Result<Visit, ApiError> {
        self.put(&format!("/visits/{id}"), changes).await
    }

    pub async fn delete_visit(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/visits/{id}")).await
    }

    // ===== Bids =====

    pub async fn create_bid(&self, bid: &BidCreate) -> Result<Bid, ApiError> {
        bid.validate().map_err(ApiError::validation)?;
        self.post("/bids", bid).await
    }

    pub async fn bid_by_id(&self, id: i64) -> Result<Bid, ApiError> {
        self.get(&format!("/bids/{id}")).await
    }

    pub async fn list_bids(&self) -> Result<Vec<Bid>, ApiError> {
        self.get("/bids").await
    }

    pub async fn update_bid(&self, id: i64, changes: &BidUpdate) -> Result<Bid, ApiError> {
        self.put(&format!("/bids/{id}"), changes).await
    }

    pub async fn delete_bid(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/bids/{id}")).await
    }

    // ===== Addresses =====

    pub async fn create_address(&self, address: &AddressCreate) -> Result<Address, ApiError> {
        address.validate().map_err(ApiError::validation)?;
        self.post("/addresses", address).await
    }

    pub async fn address_by_id(&self, id: i64) -> Result<Address, ApiError> {
        self.get(&format!("/addresses/{id}")).await
    }

    pub async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.get("/addresses").await
    }

    pub async fn update_address(
        &self,
        id: i64,
        changes: &AddressUpdate,
    ) -> Result<Address, ApiError> {
        self.put(&format!("/addresses/{id}"), changes).await
    }

    pub async fn delete_address(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/addresses/{id}")).await
    }
}
