//! Resolves the active budget period for an evaluation instant.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use finmate_domain::{months_between, DateWindow, PeriodType};

use crate::{CoreError, CoreResult};

/// Returns the `[start, end)` period of a budget that contains `now`.
///
/// Periods advance from `start_date` in whole steps. A start date at most one
/// period in the future resolves to the period immediately before it.
pub fn resolve_period(
    period_type: PeriodType,
    start_date: chrono::NaiveDate,
    now: DateTime<Utc>,
) -> CoreResult<DateWindow> {
    let today = now.date_naive();
    let steps = match period_type {
        PeriodType::Weekly => (today - start_date).num_days().div_euclid(7) as i32,
        PeriodType::Monthly => {
            let steps = months_between(start_date, today);
            if period_type.advance(start_date, steps).map_or(true, |start| start > today) {
                steps - 1
            } else {
                steps
            }
        }
    };
    if steps < -1 {
        return Err(CoreError::InvalidConfiguration(format!(
            "{period_type} budget starts on {start_date}, more than one period after {today}"
        )));
    }
    let boundary = |steps: i32| {
        period_type.advance(start_date, steps).ok_or_else(|| {
            CoreError::InvalidConfiguration(format!(
                "{period_type} period of a budget starting {start_date} falls outside the calendar"
            ))
        })
    };
    let window = DateWindow::new(boundary(steps)?, boundary(steps + 1)?)?;
    debug!(
        %period_type,
        %start_date,
        period_start = %window.start,
        period_end = %window.end,
        "resolved budget period"
    );
    Ok(window)
}

/// Share of `window` that has elapsed at `now`, clamped to `[1 day, 1]`.
///
/// The floor keeps projections finite on the first instant of a period.
pub fn elapsed_fraction(window: &DateWindow, now: DateTime<Utc>) -> f64 {
    let days = window.days().max(1) as f64;
    let period_start = window.start.and_time(NaiveTime::MIN).and_utc();
    let elapsed_days = (now - period_start).num_seconds() as f64 / 86_400.0;
    (elapsed_days / days).clamp(1.0 / days, 1.0)
}

/// Linearly extrapolates `amount` accrued so far to the end of `window`.
///
/// Works in whole seconds so a figure accrued over an exact share of the
/// period projects without rounding, using the same floor and cap as
/// [`elapsed_fraction`].
pub fn project_to_period_end(amount: Decimal, window: &DateWindow, now: DateTime<Utc>) -> Decimal {
    const DAY_SECONDS: i64 = 86_400;
    let total = window.days().max(1) * DAY_SECONDS;
    let period_start = window.start.and_time(NaiveTime::MIN).and_utc();
    let elapsed = (now - period_start).num_seconds().clamp(DAY_SECONDS, total);
    amount
        .checked_mul(Decimal::from(total))
        .and_then(|scaled| scaled.checked_div(Decimal::from(elapsed)))
        .unwrap_or(Decimal::MAX)
}
