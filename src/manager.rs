use std::sync::{PoisonError, RwLock};

use finmate_core::{storage::LedgerBackupInfo, CoreResult, LedgerStorage};
use finmate_domain::Ledger;
use tracing::{debug, info};

/// Owns the live ledger snapshot and its persistence backend.
///
/// Reads share the current snapshot. Writes run against a clone that only
/// replaces the snapshot once it has been persisted, so a failed operation or
/// a failed save leaves the previous state in place. The published snapshot is
/// therefore always consistent, and a lock poisoned by a panicking writer is
/// taken over rather than reported.
pub struct LedgerManager {
    current: RwLock<Ledger>,
    storage: Box<dyn LedgerStorage>,
}

impl LedgerManager {
    pub fn new(ledger: Ledger, storage: Box<dyn LedgerStorage>) -> Self {
        Self {
            current: RwLock::new(ledger),
            storage,
        }
    }

    /// Loads the persisted ledger, starting an empty one when none exists.
    pub fn open(storage: Box<dyn LedgerStorage>) -> CoreResult<Self> {
        let ledger = match storage.load_ledger()? {
            Some(ledger) => {
                info!(
                    ledger_id = %ledger.id,
                    expenses = ledger.expenses.len(),
                    income = ledger.income.len(),
                    budgets = ledger.budgets.len(),
                    "ledger loaded"
                );
                ledger
            }
            None => {
                info!("no stored ledger found, starting empty");
                Ledger::default()
            }
        };
        Ok(Self::new(ledger, storage))
    }

    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> CoreResult<R> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&guard))
    }

    /// Applies `f` to a copy of the ledger, persists it, then publishes it.
    pub fn commit<R>(&self, f: impl FnOnce(&mut Ledger) -> CoreResult<R>) -> CoreResult<R> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = guard.clone();
        let outcome = f(&mut snapshot)?;
        self.storage.save_ledger(&snapshot)?;
        *guard = snapshot;
        debug!("ledger committed");
        Ok(outcome)
    }

    pub fn backup(&self, note: Option<&str>) -> CoreResult<LedgerBackupInfo> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        self.storage.backup_ledger(&guard, note)
    }

    pub fn list_backups(&self) -> CoreResult<Vec<LedgerBackupInfo>> {
        self.storage.list_backups()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finmate_core::{storage::NullStorage, CategoryService, CoreError, GoalService};
    use finmate_domain::{CategoryDraft, CategoryKind, GoalDraft};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    /// Storage whose saves can be made to fail on demand.
    #[derive(Default)]
    struct FlakyStorage {
        fail: Arc<AtomicBool>,
    }

    impl LedgerStorage for FlakyStorage {
        fn save_ledger(&self, _ledger: &Ledger) -> CoreResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                Err(CoreError::Storage("disk full".into()))
            } else {
                Ok(())
            }
        }

        fn load_ledger(&self) -> CoreResult<Option<Ledger>> {
            Ok(None)
        }

        fn backup_ledger(&self, ledger: &Ledger, note: Option<&str>) -> CoreResult<LedgerBackupInfo> {
            NullStorage.backup_ledger(ledger, note)
        }

        fn list_backups(&self) -> CoreResult<Vec<LedgerBackupInfo>> {
            Ok(Vec::new())
        }
    }

    fn category(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.into(),
            kind: CategoryKind::Expense,
        }
    }

    #[test]
    fn failed_operation_leaves_snapshot_untouched() {
        let manager = LedgerManager::open(Box::new(NullStorage)).unwrap();
        let food = manager
            .commit(|ledger| CategoryService::create(ledger, category("Food")))
            .unwrap();

        let err = manager
            .commit(|ledger| CategoryService::merge(ledger, food.id, uuid::Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(manager.read(|ledger| ledger.categories.len()).unwrap(), 1);
    }

    #[test]
    fn failed_save_discards_the_change() {
        let fail = Arc::new(AtomicBool::new(false));
        let storage = FlakyStorage { fail: fail.clone() };
        let manager = LedgerManager::open(Box::new(storage)).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let goal = manager
            .commit(|ledger| {
                GoalService::create(
                    ledger,
                    GoalDraft {
                        name: "Bike".into(),
                        target_amount: dec!(500),
                        current_amount: None,
                        deadline: None,
                    },
                    now,
                )
            })
            .unwrap();

        fail.store(true, Ordering::SeqCst);
        let err = manager
            .commit(|ledger| GoalService::deposit(ledger, goal.id, dec!(50), now))
            .unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        let current = manager
            .read(|ledger| ledger.goal(goal.id).map(|goal| goal.current_amount))
            .unwrap();
        assert_eq!(current, Some(Decimal::ZERO));
    }

    #[test]
    fn panicking_writer_does_not_wedge_the_ledger() {
        let manager = LedgerManager::open(Box::new(NullStorage)).unwrap();
        let crashed = panic::catch_unwind(AssertUnwindSafe(|| {
            manager.commit(|ledger| -> CoreResult<()> {
                CategoryService::create(ledger, category("Lost"))?;
                panic!("writer crashed");
            })
        }));
        assert!(crashed.is_err());

        assert_eq!(manager.read(|ledger| ledger.categories.len()).unwrap(), 0);
        manager
            .commit(|ledger| CategoryService::create(ledger, category("Food")))
            .unwrap();
        assert_eq!(manager.read(|ledger| ledger.categories.len()).unwrap(), 1);
    }
}
