//! Ledger snapshot management.

use axum::extract::State;
use finmate_core::storage::LedgerBackupInfo;
use serde::{Deserialize, Serialize};

use crate::api::{
    extract::{Json, Query},
    ApiResult, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct BackupQuery {
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BackupEntry {
    pub id: String,
    pub created_at: String,
}

impl From<LedgerBackupInfo> for BackupEntry {
    fn from(info: LedgerBackupInfo) -> Self {
        Self {
            id: info.id,
            created_at: info.created_at,
        }
    }
}

pub async fn list_backups(State(state): State<AppState>) -> ApiResult<Json<Vec<BackupEntry>>> {
    let backups = state.manager.list_backups()?;
    Ok(Json(backups.into_iter().map(BackupEntry::from).collect()))
}

pub async fn create_backup(
    State(state): State<AppState>,
    Query(query): Query<BackupQuery>,
) -> ApiResult<Json<BackupEntry>> {
    let info = state.manager.backup(query.note.as_deref())?;
    tracing::info!(backup = %info.id, "ledger backup created");
    Ok(Json(info.into()))
}
