//! Budget registry maintenance and utilization evaluation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use finmate_domain::{
    Amounted, BelongsToCategory, Budget, BudgetDraft, BudgetStatus, CategoryKind, DateWindow,
    Ledger, PeriodType,
};

use crate::{
    money::positive_amount,
    period::{project_to_period_end, resolve_period},
    CoreError, CoreResult,
};

/// Stateless budgeting utilities that operate over [`Ledger`] snapshots.
pub struct BudgetService;

impl BudgetService {
    /// Registers a new budget, rejecting a second budget for the same scope and cadence.
    ///
    /// The start date must resolve to a period at `now`, so it may lie at most
    /// one period in the future.
    pub fn create(ledger: &mut Ledger, draft: BudgetDraft, now: DateTime<Utc>) -> CoreResult<Budget> {
        let amount = Self::validate(ledger, None, &draft, now)?;
        let mut budget = Budget::new(amount, draft.period_type, draft.start_date);
        budget.category_id = draft.category_id;
        ledger.add_budget(budget.clone());
        info!(budget_id = %budget.id, amount = %budget.amount, "budget created");
        Ok(budget)
    }

    /// Replaces every field of an existing budget.
    pub fn update(
        ledger: &mut Ledger,
        id: Uuid,
        draft: BudgetDraft,
        now: DateTime<Utc>,
    ) -> CoreResult<Budget> {
        if ledger.budget(id).is_none() {
            return Err(CoreError::not_found("budget", id));
        }
        let amount = Self::validate(ledger, Some(id), &draft, now)?;
        let budget = ledger
            .budget_mut(id)
            .ok_or_else(|| CoreError::not_found("budget", id))?;
        budget.amount = amount;
        budget.period_type = draft.period_type;
        budget.start_date = draft.start_date;
        budget.category_id = draft.category_id;
        let updated = budget.clone();
        ledger.touch();
        Ok(updated)
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> CoreResult<Budget> {
        let index = ledger
            .budgets
            .iter()
            .position(|budget| budget.id == id)
            .ok_or_else(|| CoreError::not_found("budget", id))?;
        let removed = ledger.budgets.remove(index);
        ledger.touch();
        Ok(removed)
    }

    pub fn list(ledger: &Ledger) -> Vec<&Budget> {
        ledger.budgets.iter().collect()
    }

    /// Evaluates every budget in registry order.
    ///
    /// A stored budget whose period cannot be resolved is logged and left out
    /// rather than failing the whole listing.
    pub fn statuses(ledger: &Ledger, now: DateTime<Utc>) -> Vec<BudgetStatus> {
        ledger
            .budgets
            .iter()
            .filter_map(|budget| match Self::evaluate(ledger, budget, now) {
                Ok(status) => Some(status),
                Err(err) => {
                    warn!(budget_id = %budget.id, error = %err, "skipping budget without an active period");
                    None
                }
            })
            .collect()
    }

    /// Evaluates a single budget.
    pub fn status(ledger: &Ledger, id: Uuid, now: DateTime<Utc>) -> CoreResult<BudgetStatus> {
        let budget = ledger
            .budget(id)
            .ok_or_else(|| CoreError::not_found("budget", id))?;
        Self::evaluate(ledger, budget, now)
    }

    /// Resolves the budget's active period and derives its utilization.
    pub fn evaluate(ledger: &Ledger, budget: &Budget, now: DateTime<Utc>) -> CoreResult<BudgetStatus> {
        let window = resolve_period(budget.period_type, budget.start_date, now)?;
        Ok(Self::utilization(ledger, budget, window, now))
    }

    /// Sums in-scope expenses inside `window` and projects them to the period end.
    pub fn utilization(
        ledger: &Ledger,
        budget: &Budget,
        window: DateWindow,
        now: DateTime<Utc>,
    ) -> BudgetStatus {
        let spent = Self::spent_in_window(ledger, budget.category_id, &window);
        let projected_spent = project_to_period_end(spent, &window, now);
        let status = BudgetStatus::from_parts(budget.clone(), window, spent, projected_spent);
        debug!(
            budget_id = %budget.id,
            spent = %status.spent,
            utilization_pct = %status.utilization_pct,
            projected_spent = %status.projected_spent,
            "evaluated budget"
        );
        status
    }

    /// Total of expenses dated inside `window`, optionally restricted to one category.
    pub fn spent_in_window(ledger: &Ledger, category_id: Option<Uuid>, window: &DateWindow) -> Decimal {
        ledger
            .expenses
            .iter()
            .filter(|entry| window.contains(entry.date))
            .filter(|entry| category_id.map_or(true, |id| entry.category_id() == Some(id)))
            .map(Amounted::amount)
            .sum()
    }

    /// Checks the draft and returns its amount rounded to cents.
    fn validate(
        ledger: &Ledger,
        exclude: Option<Uuid>,
        draft: &BudgetDraft,
        now: DateTime<Utc>,
    ) -> CoreResult<Decimal> {
        let amount = positive_amount("budget amount", draft.amount)?;
        if let Some(category_id) = draft.category_id {
            let category = ledger
                .category(category_id)
                .ok_or_else(|| CoreError::not_found("category", category_id))?;
            if category.kind != CategoryKind::Expense {
                return Err(CoreError::InvalidArgument(format!(
                    "budgets can only track expense categories, `{}` is {}",
                    category.name, category.kind
                )));
            }
        }
        Self::ensure_unique_scope(ledger, exclude, draft.category_id, draft.period_type)?;
        resolve_period(draft.period_type, draft.start_date, now)?;
        Ok(amount)
    }

    fn ensure_unique_scope(
        ledger: &Ledger,
        exclude: Option<Uuid>,
        category_id: Option<Uuid>,
        period_type: PeriodType,
    ) -> CoreResult<()> {
        let duplicate = ledger.budgets.iter().any(|budget| {
            budget.same_scope(category_id, period_type) && exclude.map_or(true, |id| budget.id != id)
        });
        if duplicate {
            let scope = match category_id.and_then(|id| ledger.category(id)) {
                Some(category) => format!("category `{}`", category.name),
                None => "overall spending".to_string(),
            };
            Err(CoreError::InvalidArgument(format!(
                "a {period_type} budget for {scope} already exists"
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use finmate_domain::{Category, LedgerEntry};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        date(y, m, d).and_time(NaiveTime::MIN).and_utc()
    }

    fn now() -> DateTime<Utc> {
        at(2024, 1, 15)
    }

    fn draft(amount: Decimal, category_id: Option<Uuid>) -> BudgetDraft {
        BudgetDraft {
            amount,
            period_type: PeriodType::Monthly,
            start_date: date(2024, 1, 1),
            category_id,
        }
    }

    #[test]
    fn create_rejects_non_positive_amounts() {
        let mut ledger = Ledger::new("Budgets");
        for amount in [dec!(0), dec!(-5), dec!(0.004)] {
            let err = BudgetService::create(&mut ledger, draft(amount, None), now()).unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgument(_)), "amount {amount}");
        }
    }

    #[test]
    fn create_rejects_duplicate_scope_but_allows_other_cadence() {
        let mut ledger = Ledger::new("Budgets");
        BudgetService::create(&mut ledger, draft(dec!(500), None), now()).unwrap();
        let err = BudgetService::create(&mut ledger, draft(dec!(600), None), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(ref msg) if msg.contains("overall")));

        let weekly = BudgetDraft {
            period_type: PeriodType::Weekly,
            ..draft(dec!(100), None)
        };
        BudgetService::create(&mut ledger, weekly, now()).unwrap();
        assert_eq!(ledger.budgets.len(), 2);
    }

    #[test]
    fn create_requires_existing_expense_category() {
        let mut ledger = Ledger::new("Budgets");
        let err = BudgetService::create(&mut ledger, draft(dec!(50), Some(Uuid::new_v4())), now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let salary = ledger.add_category(Category::new("Salary", CategoryKind::Income));
        let err = BudgetService::create(&mut ledger, draft(dec!(50), Some(salary)), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn update_keeps_own_scope_but_refuses_collisions() {
        let mut ledger = Ledger::new("Budgets");
        let food = ledger.add_category(Category::new("Food", CategoryKind::Expense));
        let overall = BudgetService::create(&mut ledger, draft(dec!(500), None), now()).unwrap();
        BudgetService::create(&mut ledger, draft(dec!(200), Some(food)), now()).unwrap();

        let updated = BudgetService::update(&mut ledger, overall.id, draft(dec!(750), None), now()).unwrap();
        assert_eq!(updated.amount, dec!(750));

        let err = BudgetService::update(&mut ledger, overall.id, draft(dec!(750), Some(food)), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        let err = BudgetService::update(&mut ledger, Uuid::new_v4(), draft(dec!(1), None), now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn scoped_budget_ignores_other_categories_and_out_of_window_entries() {
        let mut ledger = Ledger::new("Scope");
        let food = ledger.add_category(Category::new("Food", CategoryKind::Expense));
        let fun = ledger.add_category(Category::new("Fun", CategoryKind::Expense));
        ledger.add_entry(LedgerEntry::expense(dec!(40), date(2024, 1, 5)).with_category(food));
        ledger.add_entry(LedgerEntry::expense(dec!(60), date(2024, 1, 6)).with_category(fun));
        ledger.add_entry(LedgerEntry::expense(dec!(99), date(2024, 2, 1)).with_category(food));
        ledger.add_entry(LedgerEntry::expense(dec!(7), date(2024, 1, 7)));

        let scoped = BudgetService::create(&mut ledger, draft(dec!(100), Some(food)), now()).unwrap();
        let overall = BudgetService::create(&mut ledger, draft(dec!(100), None), now()).unwrap();

        let now = at(2024, 1, 20);
        assert_eq!(BudgetService::status(&ledger, scoped.id, now).unwrap().spent, dec!(40));
        assert_eq!(BudgetService::status(&ledger, overall.id, now).unwrap().spent, dec!(107));
    }

    #[test]
    fn status_reports_month_projection() {
        let mut ledger = Ledger::new("Projection");
        ledger.add_entry(LedgerEntry::expense(dec!(120), date(2024, 1, 3)));
        ledger.add_entry(LedgerEntry::expense(dec!(80), date(2024, 1, 10)));
        let budget = BudgetService::create(&mut ledger, draft(dec!(500), None), now()).unwrap();

        let status = BudgetService::status(&ledger, budget.id, at(2024, 1, 11)).unwrap();
        assert_eq!(status.period.start, date(2024, 1, 1));
        assert_eq!(status.period.end, date(2024, 2, 1));
        assert_eq!(status.spent, dec!(200));
        assert_eq!(status.remaining, dec!(300));
        assert_eq!(status.utilization_pct, dec!(40));
        assert_eq!(status.projected_spent, dec!(620));
        assert!(!status.is_over_budget);
    }

    #[test]
    fn over_budget_reports_negative_remaining() {
        let mut ledger = Ledger::new("Over");
        ledger.add_entry(LedgerEntry::expense(dec!(130), date(2024, 1, 2)));
        let budget = BudgetService::create(&mut ledger, draft(dec!(100), None), now()).unwrap();

        let status = BudgetService::status(&ledger, budget.id, at(2024, 1, 31)).unwrap();
        assert_eq!(status.remaining, dec!(-30));
        assert!(status.utilization_pct > Decimal::ONE_HUNDRED);
        assert!(status.is_over_budget);
    }

    #[test]
    fn create_and_update_reject_start_beyond_next_period() {
        let mut ledger = Ledger::new("Future");
        let far = BudgetDraft {
            start_date: date(2030, 1, 1),
            ..draft(dec!(100), None)
        };
        let err = BudgetService::create(&mut ledger, far.clone(), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
        assert!(ledger.budgets.is_empty());

        let next_month = BudgetDraft {
            start_date: date(2024, 2, 10),
            ..draft(dec!(100), None)
        };
        let budget = BudgetService::create(&mut ledger, next_month, now()).unwrap();
        let err = BudgetService::update(&mut ledger, budget.id, far, now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
        assert_eq!(ledger.budget(budget.id).unwrap().start_date, date(2024, 2, 10));
    }

    #[test]
    fn statuses_skip_unresolvable_budgets_and_keep_the_rest() {
        let mut ledger = Ledger::new("Mixed");
        ledger.add_entry(LedgerEntry::expense(dec!(25), date(2024, 1, 5)));
        let valid = BudgetService::create(&mut ledger, draft(dec!(100), None), now()).unwrap();
        // Loaded from disk without passing create-time checks.
        ledger.add_budget(Budget::new(dec!(50), PeriodType::Weekly, date(2031, 6, 1)));

        let statuses = BudgetService::statuses(&ledger, now());
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].budget.id, valid.id);
        assert_eq!(statuses[0].spent, dec!(25));
    }

    #[test]
    fn status_for_unknown_budget_is_not_found() {
        let ledger = Ledger::new("Empty");
        let err = BudgetService::status(&ledger, Uuid::new_v4(), at(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn remove_deletes_budget() {
        let mut ledger = Ledger::new("Remove");
        let budget = BudgetService::create(&mut ledger, draft(dec!(10), None), now()).unwrap();
        BudgetService::remove(&mut ledger, budget.id).unwrap();
        assert!(BudgetService::list(&ledger).is_empty());
        assert!(matches!(
            BudgetService::remove(&mut ledger, budget.id),
            Err(CoreError::NotFound(_))
        ));
    }
}
