//! Expense and income endpoints. Both collections share one contract; the
//! handlers differ only in which [`EntryKind`] they pass down.

use axum::extract::State;
use finmate_core::EntryService;
use finmate_domain::{EntryDraft, EntryFilter, EntryKind, LedgerEntry};
use serde::Serialize;
use uuid::Uuid;

use crate::api::{
    extract::{Json, Path, Query},
    ApiResult, AppState,
};

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub ok: bool,
}

fn list(state: &AppState, kind: EntryKind, filter: &EntryFilter) -> ApiResult<Vec<LedgerEntry>> {
    let entries = state.manager.read(|ledger| {
        EntryService::list(ledger, kind, filter)
            .into_iter()
            .cloned()
            .collect()
    })?;
    Ok(entries)
}

fn get(state: &AppState, kind: EntryKind, id: Uuid) -> ApiResult<LedgerEntry> {
    let entry = state
        .manager
        .read(|ledger| EntryService::get(ledger, kind, id).cloned())??;
    Ok(entry)
}

fn create(state: &AppState, kind: EntryKind, draft: EntryDraft) -> ApiResult<LedgerEntry> {
    let now = state.clock.now();
    Ok(state
        .manager
        .commit(|ledger| EntryService::create(ledger, kind, draft, now))?)
}

fn update(state: &AppState, kind: EntryKind, id: Uuid, draft: EntryDraft) -> ApiResult<LedgerEntry> {
    Ok(state
        .manager
        .commit(|ledger| EntryService::update(ledger, kind, id, draft))?)
}

fn delete(state: &AppState, kind: EntryKind, id: Uuid) -> ApiResult<Deleted> {
    state
        .manager
        .commit(|ledger| EntryService::remove(ledger, kind, id))?;
    Ok(Deleted { ok: true })
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(filter): Query<EntryFilter>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    list(&state, EntryKind::Expense, &filter).map(Json)
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(draft): Json<EntryDraft>,
) -> ApiResult<Json<LedgerEntry>> {
    create(&state, EntryKind::Expense, draft).map(Json)
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LedgerEntry>> {
    get(&state, EntryKind::Expense, id).map(Json)
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<EntryDraft>,
) -> ApiResult<Json<LedgerEntry>> {
    update(&state, EntryKind::Expense, id, draft).map(Json)
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Deleted>> {
    delete(&state, EntryKind::Expense, id).map(Json)
}

pub async fn list_income(
    State(state): State<AppState>,
    Query(filter): Query<EntryFilter>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    list(&state, EntryKind::Income, &filter).map(Json)
}

pub async fn create_income(
    State(state): State<AppState>,
    Json(draft): Json<EntryDraft>,
) -> ApiResult<Json<LedgerEntry>> {
    create(&state, EntryKind::Income, draft).map(Json)
}

pub async fn get_income(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LedgerEntry>> {
    get(&state, EntryKind::Income, id).map(Json)
}

pub async fn update_income(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<EntryDraft>,
) -> ApiResult<Json<LedgerEntry>> {
    update(&state, EntryKind::Income, id, draft).map(Json)
}

pub async fn delete_income(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Deleted>> {
    delete(&state, EntryKind::Income, id).map(Json)
}
