use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use finmate_core::{BudgetService, Clock, FixedClock, ReportService};
use finmate_domain::{Budget, Category, CategoryKind, Ledger, LedgerEntry, PeriodType};
use finmate_storage_json::{load_ledger_from_path, save_ledger_to_path};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn build_sample_ledger(expense_count: usize) -> Ledger {
    let mut ledger = Ledger::new("Benchmark");
    let start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    let categories: Vec<_> = ["Groceries", "Dining", "Transport", "Utilities"]
        .into_iter()
        .map(|name| ledger.add_category(Category::new(name, CategoryKind::Expense)))
        .collect();

    ledger.add_budget(Budget::new(dec!(4000), PeriodType::Monthly, start_date));
    for (idx, category) in categories.iter().enumerate() {
        let period = if idx % 2 == 0 { PeriodType::Monthly } else { PeriodType::Weekly };
        ledger.add_budget(Budget::new(dec!(500), period, start_date).scoped_to(*category));
    }

    for idx in 0..expense_count {
        let date = start_date + Days::new((idx % 365) as u64);
        let entry = LedgerEntry::expense(Decimal::from(5 + idx % 120), date)
            .with_category(categories[idx % categories.len()])
            .with_counterparty(format!("Merchant {}", idx % 40));
        ledger.add_entry(entry);
    }
    ledger
}

fn bench_budget_status(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));
    let now = FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()).now();

    c.bench_function("budget_statuses_10k", |b| {
        b.iter(|| {
            let statuses = BudgetService::statuses(&ledger, now);
            black_box(statuses);
        })
    });

    c.bench_function("month_report_10k", |b| {
        b.iter(|| {
            let report = ReportService::month(&ledger, 2025, 6).expect("report");
            black_box(report);
        })
    });
}

fn bench_ledger_io(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("ledger.json");

    c.bench_function("ledger_save_10k", |b| {
        b.iter_batched(
            || ledger.clone(),
            |snapshot| save_ledger_to_path(&snapshot, &file_path).expect("save ledger"),
            BatchSize::SmallInput,
        )
    });

    save_ledger_to_path(&ledger, &file_path).expect("seed");

    c.bench_function("ledger_load_10k", |b| {
        b.iter(|| {
            let loaded = load_ledger_from_path(&file_path).expect("load ledger");
            black_box(loaded);
        })
    });
}

criterion_group!(benches, bench_budget_status, bench_ledger_io);
criterion_main!(benches);
