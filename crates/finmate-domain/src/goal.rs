//! Savings goals, deposits, and projected progress.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A savings target funded through explicit deposits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(name: impl Into<String>, target_amount: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount,
            current_amount: Decimal::ZERO,
            deadline: None,
            created_at,
        }
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Percentage of the target saved so far; zero for a non-positive target.
    pub fn progress_pct(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.current_amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(self.target_amount))
            .map(|pct| pct.round_dp(2))
            .unwrap_or(Decimal::MAX)
    }
}

/// Fields accepted when creating a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Option<Decimal>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// Partial update applied to an existing goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_amount: Option<Decimal>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// Append-only record of a single deposit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalContribution {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl GoalContribution {
    pub fn new(goal_id: Uuid, amount: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id,
            amount,
            created_at,
        }
    }
}

/// Projection of a goal's completion from recent net savings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub remaining_amount: Decimal,
    pub progress_pct: Decimal,
    pub days_left: Option<i64>,
    pub is_completed: bool,
    pub message: String,
    pub monthly_net_savings: Decimal,
    pub projected_months_to_complete: Option<Decimal>,
    pub estimated_completion_date: Option<NaiveDate>,
    pub behind_pct: Option<f64>,
}
