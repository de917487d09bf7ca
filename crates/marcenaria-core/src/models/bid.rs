use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::budget_request::BudgetRequest;
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Pending => "PENDING",
            BidStatus::Accepted => "ACCEPTED",
            BidStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A carpenter's priced offer on a budget request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Bid {
    pub id: i64,
    #[serde(rename = "budgetRequest", default)]
    pub budget_request: Option<Box<BudgetRequest>>,
    pub carpenter: User,
    pub price: f64,
    /// Free text, e.g. "6 weeks".
    #[serde(rename = "estimatedDuration")]
    pub estimated_duration: String,
    pub description: String,
    pub status: BidStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Bid {
    pub fn is_pending(&self) -> bool {
        self.status == BidStatus::Pending
    }

    /// Price rendered for listings, e.g. "R$ 3500.00".
    pub fn price_str(&self) -> String {
        format!("R$ {:.2}", self.price)
    }
}

/// Payload for placing a bid. New bids always start out PENDING.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct BidCreate {
    #[serde(rename = "budgetRequestId")]
    pub budget_request_id: i64,
    #[serde(rename = "carpenterId")]
    pub carpenter_id: i64,
    pub price: f64,
    #[serde(rename = "estimatedDuration")]
    pub estimated_duration: String,
    pub description: String,
}

impl BidCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.budget_request_id <= 0 {
            return Err("budgetRequestId must reference a budget request".to_string());
        }
        if self.carpenter_id <= 0 {
            return Err("carpenterId must reference a carpenter account".to_string());
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err("price must be positive".to_string());
        }
        if self.estimated_duration.trim().is_empty() {
            return Err("estimatedDuration is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        Ok(())
    }
}

/// Partial update: reprice, re-describe, or resolve the bid.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct BidUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "estimatedDuration", skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BidStatus>,
}
