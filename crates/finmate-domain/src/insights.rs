//! Classifier feedback, recurring-charge markers, and anomaly flags.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-confirmed merchant to category mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MerchantFeedback {
    /// Normalized merchant key (lowercase, collapsed whitespace).
    pub merchant: String,
    pub category: String,
    pub confirmed_at: DateTime<Utc>,
}

/// A merchant the user confirmed as a recurring charge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringSeries {
    pub merchant: String,
    pub amount: Decimal,
    #[serde(default)]
    pub interval_days: Option<f64>,
    pub confirmed_at: DateTime<Utc>,
}

/// An expense flagged as unusually large.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Anomaly {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    pub score: f64,
    pub message: String,
    #[serde(default)]
    pub dismissed: bool,
    #[serde(default)]
    pub snoozed_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
