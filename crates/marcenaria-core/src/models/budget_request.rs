use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::bid::Bid;
use super::user::User;
use super::visit::Visit;

/// Lifecycle of a budget request, from publication to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum BudgetStatus {
    Open,
    WaitingVisit,
    WaitingBids,
    Closed,
    Cancelled,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Open => "OPEN",
            BudgetStatus::WaitingVisit => "WAITING_VISIT",
            BudgetStatus::WaitingBids => "WAITING_BIDS",
            BudgetStatus::Closed => "CLOSED",
            BudgetStatus::Cancelled => "CANCELLED",
        }
    }

    /// Closed and cancelled requests accept no further activity.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BudgetStatus::Closed | BudgetStatus::Cancelled)
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client's request for a custom furniture quote.
///
/// `visits` and `bids` come back populated on detail endpoints and may be
/// empty on list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct BudgetRequest {
    pub id: i64,
    pub client: User,
    pub description: String,
    #[serde(rename = "referenceImages", default)]
    pub reference_images: Vec<String>,
    pub status: BudgetStatus,
    pub location: Address,
    #[serde(rename = "estimatedBudget", default)]
    pub estimated_budget: Option<f64>,
    #[serde(rename = "desiredDeadline", default)]
    pub desired_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub visits: Vec<Visit>,
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl BudgetRequest {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Bids still awaiting the client's decision.
    pub fn pending_bids(&self) -> impl Iterator<Item = &Bid> {
        self.bids
            .iter()
            .filter(|b| b.status == super::bid::BidStatus::Pending)
    }
}

/// Payload for publishing a new budget request. The location must already
/// exist as a registered address.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct BudgetRequestCreate {
    pub description: String,
    #[serde(rename = "referenceImages", skip_serializing_if = "Vec::is_empty")]
    pub reference_images: Vec<String>,
    #[serde(rename = "locationId")]
    pub location_id: i64,
    #[serde(rename = "estimatedBudget", skip_serializing_if = "Option::is_none")]
    pub estimated_budget: Option<f64>,
    #[serde(rename = "desiredDeadline", skip_serializing_if = "Option::is_none")]
    pub desired_deadline: Option<NaiveDate>,
}

impl BudgetRequestCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        if self.location_id <= 0 {
            return Err("locationId must reference a registered address".to_string());
        }
        if let Some(budget) = self.estimated_budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err("estimatedBudget must be positive".to_string());
            }
        }
        Ok(())
    }
}

/// Partial update for a budget request. Status moves through the
/// dedicated status operation, not through this payload.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct BudgetRequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "referenceImages", skip_serializing_if = "Option::is_none")]
    pub reference_images: Option<Vec<String>>,
    #[serde(rename = "estimatedBudget", skip_serializing_if = "Option::is_none")]
    pub estimated_budget: Option<f64>,
    #[serde(rename = "desiredDeadline", skip_serializing_if = "Option::is_none")]
    pub desired_deadline: Option<NaiveDate>,
}
