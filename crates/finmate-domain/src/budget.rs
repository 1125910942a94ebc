//! Budget definitions and the derived utilization status.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, ledger::DateWindow};

/// A spending guardrail over one category, or over all expenses when unscoped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub period_type: PeriodType,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl Budget {
    pub fn new(amount: Decimal, period_type: PeriodType, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            period_type,
            start_date,
            category_id: None,
        }
    }

    pub fn scoped_to(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Returns `true` for the "Overall Budget" covering every expense category.
    pub fn is_overall(&self) -> bool {
        self.category_id.is_none()
    }

    /// Whether `other` tracks the same scope and cadence.
    pub fn same_scope(&self, category_id: Option<Uuid>, period_type: PeriodType) -> bool {
        self.category_id == category_id && self.period_type == period_type
    }
}

impl BelongsToCategory for Budget {
    fn category_id(&self) -> Option<Uuid> {
        self.category_id
    }
}

impl Amounted for Budget {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Fields a caller supplies when creating or replacing a budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetDraft {
    pub amount: Decimal,
    #[serde(default)]
    pub period_type: PeriodType,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

/// Utilization of a budget over its active period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub period: DateWindow,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub utilization_pct: Decimal,
    pub projected_spent: Decimal,
    pub is_over_budget: bool,
}

impl BudgetStatus {
    /// Derives every status field from the budget, its window, and the raw figures.
    ///
    /// Over-budget is decided by the exact `spent > amount` comparison; the
    /// percentage saturates instead of overflowing.
    pub fn from_parts(budget: Budget, period: DateWindow, spent: Decimal, projected_spent: Decimal) -> Self {
        let remaining = budget.amount - spent;
        let utilization_pct = spent
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(budget.amount))
            .unwrap_or(Decimal::MAX);
        let is_over_budget = spent > budget.amount;
        Self {
            budget,
            period,
            spent,
            remaining,
            utilization_pct,
            projected_spent,
            is_over_budget,
        }
    }
}
