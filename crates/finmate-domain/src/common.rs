//! Shared traits, calendar helpers, and enums for budgeting primitives.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest amount accepted for a single entry, budget, goal, or deposit.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Rounds a monetary amount to whole cents, halves away from zero.
pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Associates entities with optional category ownership.
pub trait BelongsToCategory {
    fn category_id(&self) -> Option<Uuid>;
}

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> Decimal;
}

/// Enumerates the cadences a budget can track against.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Weekly,
    #[default]
    Monthly,
}

impl PeriodType {
    /// Returns the start of the `steps`-th period counted from `anchor`, or
    /// `None` when that date falls outside the representable calendar.
    ///
    /// Monthly boundaries reuse the anchor's day-of-month, clamped to the
    /// length of the target month.
    pub fn advance(self, anchor: NaiveDate, steps: i32) -> Option<NaiveDate> {
        match self {
            PeriodType::Weekly => {
                let days = Days::new(u64::from(steps.unsigned_abs()) * 7);
                if steps >= 0 {
                    anchor.checked_add_days(days)
                } else {
                    anchor.checked_sub_days(days)
                }
            }
            PeriodType::Monthly => shift_month(anchor, steps),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PeriodType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PeriodType::Weekly),
            "monthly" => Ok(PeriodType::Monthly),
            other => Err(format!("unsupported period type `{other}`")),
        }
    }
}

/// Shifts `date` by whole calendar months, clamping the day to the month length.
///
/// Returns `None` when the result lies outside the range `NaiveDate` supports.
pub fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Number of days in the given calendar month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole calendar months between the months of `from` and `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() * 12 + to.month0() as i32) - (from.year() * 12 + from.month0() as i32)
}
