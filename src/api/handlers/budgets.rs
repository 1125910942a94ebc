use axum::extract::State;
use finmate_core::{BudgetService, CoreError};
use finmate_domain::{Budget, BudgetDraft, BudgetStatus};
use uuid::Uuid;

use super::entries::Deleted;
use crate::api::{
    extract::{Json, Path},
    ApiResult, AppState,
};

pub async fn list_budgets(State(state): State<AppState>) -> ApiResult<Json<Vec<Budget>>> {
    let budgets = state
        .manager
        .read(|ledger| BudgetService::list(ledger).into_iter().cloned().collect())?;
    Ok(Json(budgets))
}

pub async fn create_budget(
    State(state): State<AppState>,
    Json(draft): Json<BudgetDraft>,
) -> ApiResult<Json<Budget>> {
    let now = state.clock.now();
    let budget = state
        .manager
        .commit(|ledger| BudgetService::create(ledger, draft, now))?;
    Ok(Json(budget))
}

pub async fn get_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Budget>> {
    let budget = state.manager.read(|ledger| {
        ledger
            .budget(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("budget", id))
    })??;
    Ok(Json(budget))
}

pub async fn update_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<BudgetDraft>,
) -> ApiResult<Json<Budget>> {
    let now = state.clock.now();
    let budget = state
        .manager
        .commit(|ledger| BudgetService::update(ledger, id, draft, now))?;
    Ok(Json(budget))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Deleted>> {
    state
        .manager
        .commit(|ledger| BudgetService::remove(ledger, id))?;
    Ok(Json(Deleted { ok: true }))
}

pub async fn list_statuses(State(state): State<AppState>) -> ApiResult<Json<Vec<BudgetStatus>>> {
    let now = state.clock.now();
    let statuses = state
        .manager
        .read(|ledger| BudgetService::statuses(ledger, now))?;
    Ok(Json(statuses))
}

pub async fn budget_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BudgetStatus>> {
    let now = state.clock.now();
    let status = state
        .manager
        .read(|ledger| BudgetService::status(ledger, id, now))??;
    Ok(Json(status))
}
