use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::budget_request::BudgetRequest;
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum VisitStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Scheduled => "SCHEDULED",
            VisitStatus::Completed => "COMPLETED",
            VisitStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seller's measurement visit to the request's location.
///
/// `budget_request` is boxed because the parent record embeds its visits;
/// list endpoints may prune the back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Visit {
    pub id: i64,
    #[serde(rename = "budgetRequest", default)]
    pub budget_request: Option<Box<BudgetRequest>>,
    pub seller: User,
    #[serde(rename = "scheduledDate")]
    pub scheduled_date: DateTime<Utc>,
    pub status: VisitStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for scheduling a visit. Related records go by id.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct VisitCreate {
    #[serde(rename = "budgetRequestId")]
    pub budget_request_id: i64,
    #[serde(rename = "sellerId")]
    pub seller_id: i64,
    #[serde(rename = "scheduledDate")]
    pub scheduled_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl VisitCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.budget_request_id <= 0 {
            return Err("budgetRequestId must reference a budget request".to_string());
        }
        if self.seller_id <= 0 {
            return Err("sellerId must reference a seller account".to_string());
        }
        Ok(())
    }
}

/// Partial update: reschedule, annotate, or move the status along.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct VisitUpdate {
    #[serde(rename = "scheduledDate", skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VisitStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
