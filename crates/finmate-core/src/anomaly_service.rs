use std::cmp::Reverse;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use finmate_domain::{Anomaly, Ledger};

use crate::{CoreError, CoreResult};

pub const DEFAULT_SCAN_DAYS: i64 = 30;
pub const DEFAULT_SNOOZE_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanOutcome {
    pub created: usize,
}

/// Flags unusually large expenses and tracks the user's response to each flag.
pub struct AnomalyService;

impl AnomalyService {
    /// Flags expenses dated within the last `days` whose amount exceeds `threshold`.
    ///
    /// An expense is flagged at most once.
    pub fn scan(
        ledger: &mut Ledger,
        now: DateTime<Utc>,
        days: i64,
        threshold: Decimal,
    ) -> CoreResult<ScanOutcome> {
        let window = u64::try_from(days)
            .map_err(|_| CoreError::InvalidArgument("scan window cannot be negative".into()))?;
        let since = now
            .date_naive()
            .checked_sub_days(Days::new(window))
            .ok_or_else(|| {
                CoreError::InvalidArgument(format!("scan window of {days} days reaches past the calendar"))
            })?;
        let flagged: Vec<Anomaly> = ledger
            .expenses
            .iter()
            .filter(|entry| entry.date >= since && entry.amount > threshold)
            .filter(|entry| !ledger.anomalies.iter().any(|anomaly| anomaly.expense_id == entry.id))
            .map(|entry| {
                let category = entry
                    .category_id
                    .and_then(|id| ledger.category(id))
                    .map(|category| category.name.clone());
                warn!(expense_id = %entry.id, amount = %entry.amount, "expense flagged as anomaly");
                Anomaly {
                    id: Uuid::new_v4(),
                    expense_id: entry.id,
                    amount: entry.amount,
                    category,
                    score: 1.0,
                    message: format!("Amount exceeds the {threshold:.2} anomaly threshold"),
                    dismissed: false,
                    snoozed_until: None,
                    created_at: now,
                }
            })
            .collect();

        let created = flagged.len();
        if created > 0 {
            ledger.anomalies.extend(flagged);
            ledger.touch();
        }
        info!(days, %threshold, created, "anomaly scan finished");
        Ok(ScanOutcome { created })
    }

    /// Newest first; dismissed flags only when requested.
    pub fn list(ledger: &Ledger, include_dismissed: bool) -> Vec<&Anomaly> {
        let mut anomalies: Vec<_> = ledger
            .anomalies
            .iter()
            .filter(|anomaly| include_dismissed || !anomaly.dismissed)
            .collect();
        anomalies.sort_by_key(|anomaly| Reverse(anomaly.created_at));
        anomalies
    }

    pub fn dismiss(ledger: &mut Ledger, id: Uuid) -> CoreResult<Anomaly> {
        let anomaly = Self::find_mut(ledger, id)?;
        anomaly.dismissed = true;
        let dismissed = anomaly.clone();
        ledger.touch();
        Ok(dismissed)
    }

    /// Hides the flag until `today + days`.
    pub fn snooze(ledger: &mut Ledger, id: Uuid, days: i64, today: NaiveDate) -> CoreResult<Anomaly> {
        let until = u64::try_from(days)
            .ok()
            .filter(|days| *days > 0)
            .ok_or_else(|| CoreError::InvalidArgument("snooze days must be positive".into()))
            .and_then(|days| {
                today.checked_add_days(Days::new(days)).ok_or_else(|| {
                    CoreError::InvalidArgument(format!("snoozing {days} days reaches past the calendar"))
                })
            })?;
        let anomaly = Self::find_mut(ledger, id)?;
        anomaly.snoozed_until = Some(until);
        let snoozed = anomaly.clone();
        ledger.touch();
        Ok(snoozed)
    }

    fn find_mut(ledger: &mut Ledger, id: Uuid) -> CoreResult<&mut Anomaly> {
        ledger
            .anomalies
            .iter_mut()
            .find(|anomaly| anomaly.id == id)
            .ok_or_else(|| CoreError::not_found("anomaly", id))
    }
}
