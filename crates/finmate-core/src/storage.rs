use std::path::PathBuf;

use finmate_domain::Ledger;

use crate::CoreError;

/// Describes a persisted backup artifact for the ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing the ledger and its backups.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, ledger: &Ledger) -> Result<(), CoreError>;
    /// Returns `None` when nothing has been persisted yet.
    fn load_ledger(&self) -> Result<Option<Ledger>, CoreError>;
    fn backup_ledger(
        &self,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError>;
    fn list_backups(&self) -> Result<Vec<LedgerBackupInfo>, CoreError>;
}

/// Storage that keeps nothing; used for ephemeral servers and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStorage;

impl LedgerStorage for NullStorage {
    fn save_ledger(&self, _ledger: &Ledger) -> Result<(), CoreError> {
        Ok(())
    }

    fn load_ledger(&self) -> Result<Option<Ledger>, CoreError> {
        Ok(None)
    }

    fn backup_ledger(
        &self,
        _ledger: &Ledger,
        _note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        Err(CoreError::Storage("in-memory storage keeps no backups".into()))
    }

    fn list_backups(&self) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        Ok(Vec::new())
    }
}
