use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    anomaly_service::AnomalyService, budget_service::BudgetService,
    category_service::CategoryService, entry_service::EntryService, goal_service::GoalService,
    report_service::ReportService, time::Clock, CoreError, FixedClock,
};
use finmate_domain::{
    BudgetDraft, CategoryDraft, CategoryKind, EntryDraft, EntryFilter, EntryKind, GoalDraft,
    Ledger, PeriodType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn expense(ledger: &mut Ledger, amount: Decimal, on: NaiveDate, category_id: Option<uuid::Uuid>) {
    let draft = EntryDraft {
        amount,
        date: on,
        category_id,
        counterparty: None,
        notes: None,
    };
    let now = on.and_time(chrono::NaiveTime::MIN).and_utc();
    EntryService::create(ledger, EntryKind::Expense, draft, now).expect("record expense");
}

fn monthly_budget(amount: Decimal, start_date: NaiveDate) -> BudgetDraft {
    BudgetDraft {
        amount,
        period_type: PeriodType::Monthly,
        start_date,
        category_id: None,
    }
}

#[test]
fn overall_monthly_budget_projects_month_end_spend() {
    let clock = FixedClock::at_date(date(2024, 1, 11));
    let mut ledger = Ledger::new("Household");
    let budget = BudgetService::create(&mut ledger, monthly_budget(dec!(500), date(2024, 1, 1)), clock.now())
        .expect("create budget");
    expense(&mut ledger, dec!(150), date(2024, 1, 4), None);
    expense(&mut ledger, dec!(50), date(2024, 1, 10), None);
    expense(&mut ledger, dec!(75), date(2023, 12, 31), None);

    let statuses = BudgetService::statuses(&ledger, clock.now());
    assert_eq!(statuses.len(), 1);
    let status = &statuses[0];
    assert_eq!(status.budget.id, budget.id);
    assert_eq!(status.spent, dec!(200));
    assert_eq!(status.remaining, dec!(300));
    assert_eq!(status.utilization_pct, dec!(40));
    assert_eq!(status.projected_spent, dec!(620));
    assert!(!status.is_over_budget);
    assert!(status.projected_spent >= status.spent);
}

#[test]
fn cent_amounts_summing_to_the_limit_are_not_over_budget() {
    let clock = FixedClock::at_date(date(2024, 1, 20));
    let mut ledger = Ledger::new("Household");
    BudgetService::create(&mut ledger, monthly_budget(dec!(0.3), date(2024, 1, 1)), clock.now())
        .expect("create budget");
    expense(&mut ledger, dec!(0.1), date(2024, 1, 2), None);
    expense(&mut ledger, dec!(0.2), date(2024, 1, 3), None);

    let at_limit = BudgetService::statuses(&ledger, clock.now()).remove(0);
    assert_eq!(at_limit.spent, dec!(0.3));
    assert_eq!(at_limit.utilization_pct, Decimal::ONE_HUNDRED);
    assert!(!at_limit.is_over_budget);

    expense(&mut ledger, dec!(0.01), date(2024, 1, 4), None);
    let over = BudgetService::statuses(&ledger, clock.now()).remove(0);
    assert!(over.is_over_budget);
    assert!(over.utilization_pct > Decimal::ONE_HUNDRED);
    assert_eq!(over.remaining, dec!(-0.01));
}

#[test]
fn far_future_budget_is_refused_and_existing_statuses_survive() {
    let clock = FixedClock::at_date(date(2024, 1, 11));
    let mut ledger = Ledger::new("Household");
    BudgetService::create(&mut ledger, monthly_budget(dec!(500), date(2024, 1, 1)), clock.now())
        .expect("create budget");

    let far = BudgetDraft {
        period_type: PeriodType::Weekly,
        ..monthly_budget(dec!(50), date(2024, 3, 1))
    };
    let err = BudgetService::create(&mut ledger, far, clock.now()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfiguration(_)));

    let statuses = BudgetService::statuses(&ledger, clock.now());
    assert_eq!(statuses.len(), 1);
}

#[test]
fn status_queries_are_idempotent() {
    let clock = FixedClock::at_date(date(2024, 2, 10));
    let mut ledger = Ledger::new("Household");
    let food = CategoryService::create(
        &mut ledger,
        CategoryDraft {
            name: "Food".into(),
            kind: CategoryKind::Expense,
        },
    )
    .expect("create category");
    BudgetService::create(
        &mut ledger,
        BudgetDraft {
            category_id: Some(food.id),
            ..monthly_budget(dec!(300), date(2024, 1, 15))
        },
        clock.now(),
    )
    .expect("create budget");
    expense(&mut ledger, dec!(120), date(2024, 1, 20), Some(food.id));
    expense(&mut ledger, dec!(400), date(2024, 2, 1), None);

    let first = BudgetService::statuses(&ledger, clock.now());
    let second = BudgetService::statuses(&ledger, clock.now());
    assert_eq!(first, second);
    assert_eq!(first[0].period.start, date(2024, 1, 15));
    assert_eq!(first[0].period.end, date(2024, 2, 15));
    assert_eq!(first[0].spent, dec!(120));
}

#[test]
fn merge_moves_every_reference_to_target() {
    let clock = FixedClock::at_date(date(2024, 3, 5));
    let mut ledger = Ledger::new("Household");
    let draft = |name: &str| CategoryDraft {
        name: name.into(),
        kind: CategoryKind::Expense,
    };
    let dining = CategoryService::create(&mut ledger, draft("Dining")).expect("dining");
    let food = CategoryService::create(&mut ledger, draft("Food")).expect("food");
    expense(&mut ledger, dec!(12), date(2024, 3, 1), Some(dining.id));
    expense(&mut ledger, dec!(30), date(2024, 3, 2), Some(food.id));
    BudgetService::create(
        &mut ledger,
        BudgetDraft {
            amount: dec!(100),
            period_type: PeriodType::Weekly,
            start_date: date(2024, 3, 1),
            category_id: Some(dining.id),
        },
        clock.now(),
    )
    .expect("budget");

    let outcome = CategoryService::merge(&mut ledger, dining.id, food.id).expect("merge");
    assert_eq!(outcome.expenses_moved, 1);
    assert_eq!(outcome.budgets_moved, 1);

    assert!(ledger
        .all_entries()
        .all(|entry| entry.category_id != Some(dining.id)));
    assert!(ledger
        .budgets
        .iter()
        .all(|budget| budget.category_id == Some(food.id)));
    let filter = EntryFilter {
        category_id: Some(food.id),
        ..EntryFilter::default()
    };
    assert_eq!(EntryService::list(&ledger, EntryKind::Expense, &filter).len(), 2);
    assert!(matches!(
        CategoryService::get(&ledger, dining.id),
        Err(CoreError::NotFound(_))
    ));

    let status = BudgetService::statuses(&ledger, clock.now());
    assert_eq!(status[0].spent, dec!(42));
}

#[test]
fn merge_into_category_with_same_cadence_budget_is_refused() {
    let clock = FixedClock::at_date(date(2024, 3, 5));
    let mut ledger = Ledger::new("Household");
    let draft = |name: &str| CategoryDraft {
        name: name.into(),
        kind: CategoryKind::Expense,
    };
    let dining = CategoryService::create(&mut ledger, draft("Dining")).expect("dining");
    let food = CategoryService::create(&mut ledger, draft("Food")).expect("food");
    for category in [dining.id, food.id] {
        BudgetService::create(
            &mut ledger,
            BudgetDraft {
                category_id: Some(category),
                ..monthly_budget(dec!(100), date(2024, 3, 1))
            },
            clock.now(),
        )
        .expect("budget");
    }

    let err = CategoryService::merge(&mut ledger, dining.id, food.id).unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(_)));
    assert_eq!(BudgetService::statuses(&ledger, clock.now()).len(), 2);
    assert!(CategoryService::get(&ledger, dining.id).is_ok());
}

#[test]
fn deposits_feed_goal_progress() {
    let clock = FixedClock::at_date(date(2024, 5, 1));
    let mut ledger = Ledger::new("Household");
    let goal = GoalService::create(
        &mut ledger,
        GoalDraft {
            name: "Vacation".into(),
            target_amount: dec!(2000),
            current_amount: None,
            deadline: Some(date(2024, 12, 1)),
        },
        clock.now(),
    )
    .expect("goal");

    let mut previous = Decimal::ZERO;
    for amount in [dec!(100), dec!(250), dec!(0.01)] {
        let updated = GoalService::deposit(&mut ledger, goal.id, amount, clock.now()).expect("deposit");
        assert_eq!(updated.current_amount, previous + amount);
        previous = updated.current_amount;
    }
    let err = GoalService::deposit(&mut ledger, goal.id, Decimal::ZERO, clock.now()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(_)));

    let progress = GoalService::progress(&ledger, goal.id, clock.now(), 3).expect("progress");
    assert_eq!(progress.current_amount, dec!(350.01));
    assert_eq!(progress.days_left, Some(214));
}

#[test]
fn out_of_calendar_requests_fail_cleanly() {
    let clock = FixedClock::at_date(date(2024, 3, 20));
    let mut ledger = Ledger::new("Household");
    expense(&mut ledger, dec!(5000), date(2024, 3, 10), None);

    let err = AnomalyService::scan(&mut ledger, clock.now(), i64::MAX, dec!(1000)).unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(_)));
    let outcome = AnomalyService::scan(&mut ledger, clock.now(), 30, dec!(1000)).expect("scan");
    assert_eq!(outcome.created, 1);

    let id = ledger.anomalies[0].id;
    let err = AnomalyService::snooze(&mut ledger, id, i64::MAX, clock.today()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(_)));

    let err = ReportService::month(&ledger, NaiveDate::MAX.year(), 12).unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(_)));
}
