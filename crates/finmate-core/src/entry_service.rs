use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use finmate_domain::{EntryDraft, EntryFilter, EntryKind, Ledger, LedgerEntry};

use crate::{money::non_negative_amount, CoreError, CoreResult};

/// Create/read/update/delete for expense and income entries.
///
/// Both collections share one contract; `kind` selects which one is touched.
pub struct EntryService;

impl EntryService {
    pub fn create(
        ledger: &mut Ledger,
        kind: EntryKind,
        draft: EntryDraft,
        now: DateTime<Utc>,
    ) -> CoreResult<LedgerEntry> {
        let amount = Self::validate(ledger, kind, &draft)?;
        let mut entry = LedgerEntry::new(kind, amount, draft.date, now);
        entry.category_id = draft.category_id;
        entry.counterparty = clean(draft.counterparty);
        entry.notes = clean(draft.notes);
        ledger.add_entry(entry.clone());
        debug!(%kind, entry_id = %entry.id, amount = %entry.amount, "entry recorded");
        Ok(entry)
    }

    pub fn get(ledger: &Ledger, kind: EntryKind, id: Uuid) -> CoreResult<&LedgerEntry> {
        ledger
            .entry(kind, id)
            .ok_or_else(|| CoreError::not_found(&kind.to_string(), id))
    }

    pub fn update(
        ledger: &mut Ledger,
        kind: EntryKind,
        id: Uuid,
        draft: EntryDraft,
    ) -> CoreResult<LedgerEntry> {
        Self::get(ledger, kind, id)?;
        let amount = Self::validate(ledger, kind, &draft)?;
        let entry = ledger
            .entry_mut(kind, id)
            .ok_or_else(|| CoreError::not_found(&kind.to_string(), id))?;
        entry.amount = amount;
        entry.date = draft.date;
        entry.category_id = draft.category_id;
        entry.counterparty = clean(draft.counterparty);
        entry.notes = clean(draft.notes);
        let updated = entry.clone();
        ledger.touch();
        Ok(updated)
    }

    pub fn remove(ledger: &mut Ledger, kind: EntryKind, id: Uuid) -> CoreResult<LedgerEntry> {
        let entries = ledger.entries_mut(kind);
        let index = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| CoreError::not_found(&kind.to_string(), id))?;
        let removed = entries.remove(index);
        if kind == EntryKind::Expense {
            ledger.anomalies.retain(|anomaly| anomaly.expense_id != id);
        }
        ledger.touch();
        Ok(removed)
    }

    /// Entries matching `filter`, newest first.
    pub fn list<'a>(ledger: &'a Ledger, kind: EntryKind, filter: &EntryFilter) -> Vec<&'a LedgerEntry> {
        let mut matches: Vec<_> = ledger
            .entries(kind)
            .iter()
            .filter(|entry| filter.matches(entry))
            .collect();
        matches.sort_by_key(|entry| (Reverse(entry.date), Reverse(entry.created_at)));
        matches
            .into_iter()
            .skip(filter.skip.unwrap_or(0))
            .take(filter.limit.unwrap_or(EntryFilter::DEFAULT_LIMIT))
            .collect()
    }

    /// Checks the draft against the ledger and returns its amount rounded to cents.
    fn validate(ledger: &Ledger, kind: EntryKind, draft: &EntryDraft) -> CoreResult<Decimal> {
        let amount = non_negative_amount(&format!("{kind} amount"), draft.amount)?;
        if let Some(category_id) = draft.category_id {
            let category = ledger
                .category(category_id)
                .ok_or_else(|| CoreError::not_found("category", category_id))?;
            if category.kind != kind.category_kind() {
                return Err(CoreError::InvalidArgument(format!(
                    "category `{}` is {}, not {kind}",
                    category.name, category.kind
                )));
            }
        }
        Ok(amount)
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use finmate_domain::{Category, CategoryKind};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn draft(amount: Decimal, on: NaiveDate) -> EntryDraft {
        EntryDraft {
            amount,
            date: on,
            category_id: None,
            counterparty: None,
            notes: None,
        }
    }

    #[test]
    fn create_checks_category_kind() {
        let mut ledger = Ledger::new("Entries");
        let salary = ledger.add_category(Category::new("Salary", CategoryKind::Income));
        let err = EntryService::create(
            &mut ledger,
            EntryKind::Expense,
            EntryDraft {
                category_id: Some(salary),
                ..draft(dec!(10), date(2024, 1, 1))
            },
            now(),
        )
        .expect_err("income category on expense");
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        let entry = EntryService::create(
            &mut ledger,
            EntryKind::Income,
            EntryDraft {
                category_id: Some(salary),
                counterparty: Some("  ACME  ".into()),
                ..draft(dec!(2500), date(2024, 1, 1))
            },
            now(),
        )
        .unwrap();
        assert_eq!(entry.counterparty.as_deref(), Some("ACME"));
        assert_eq!(entry.created_at, now());
        assert_eq!(ledger.income.len(), 1);
    }

    #[test]
    fn create_rejects_negative_amounts_and_unknown_categories() {
        let mut ledger = Ledger::new("Entries");
        let err = EntryService::create(&mut ledger, EntryKind::Expense, draft(dec!(-1), date(2024, 1, 1)), now())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        let missing = EntryDraft {
            category_id: Some(Uuid::new_v4()),
            ..draft(dec!(1), date(2024, 1, 1))
        };
        let err = EntryService::create(&mut ledger, EntryKind::Expense, missing, now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn list_orders_newest_first_and_pages() {
        let mut ledger = Ledger::new("Entries");
        for day in [3, 1, 2] {
            let amount = Decimal::from(day);
            EntryService::create(&mut ledger, EntryKind::Expense, draft(amount, date(2024, 1, day)), now())
                .unwrap();
        }
        let all = EntryService::list(&ledger, EntryKind::Expense, &EntryFilter::default());
        let days: Vec<_> = all.iter().map(|entry| entry.amount).collect();
        assert_eq!(days, vec![dec!(3), dec!(2), dec!(1)]);

        let page = EntryFilter {
            skip: Some(1),
            limit: Some(1),
            ..EntryFilter::default()
        };
        let page = EntryService::list(&ledger, EntryKind::Expense, &page);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].amount, dec!(2));
    }

    #[test]
    fn update_and_remove_respect_kind() {
        let mut ledger = Ledger::new("Entries");
        let entry = EntryService::create(&mut ledger, EntryKind::Expense, draft(dec!(5), date(2024, 1, 1)), now())
            .unwrap();

        let err = EntryService::get(&ledger, EntryKind::Income, entry.id).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let updated = EntryService::update(
            &mut ledger,
            EntryKind::Expense,
            entry.id,
            draft(dec!(7.504), date(2024, 1, 4)),
        )
        .unwrap();
        assert_eq!(updated.amount, dec!(7.50));
        assert_eq!(updated.created_at, entry.created_at);

        EntryService::remove(&mut ledger, EntryKind::Expense, entry.id).unwrap();
        assert!(ledger.expenses.is_empty());
    }
}
