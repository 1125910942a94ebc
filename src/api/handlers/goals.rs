use axum::extract::State;
use finmate_core::GoalService;
use finmate_domain::{Goal, GoalContribution, GoalDraft, GoalPatch, GoalProgress};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entries::Deleted;
use crate::api::{
    extract::{Json, Path},
    ApiResult, AppState,
};

/// Deposit body: either a bare JSON number or `{"amount": n}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum DepositBody {
    Bare(Decimal),
    Wrapped { amount: Decimal },
}

impl DepositBody {
    pub fn amount(self) -> Decimal {
        match self {
            DepositBody::Bare(amount) | DepositBody::Wrapped { amount } => amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub message: &'static str,
    pub current_amount: Decimal,
}

pub async fn list_goals(State(state): State<AppState>) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state
        .manager
        .read(|ledger| GoalService::list(ledger).into_iter().cloned().collect())?;
    Ok(Json(goals))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(draft): Json<GoalDraft>,
) -> ApiResult<Json<Goal>> {
    let now = state.clock.now();
    let goal = state
        .manager
        .commit(|ledger| GoalService::create(ledger, draft, now))?;
    Ok(Json(goal))
}

pub async fn get_goal(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Goal>> {
    let goal = state
        .manager
        .read(|ledger| GoalService::get(ledger, id).cloned())??;
    Ok(Json(goal))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<GoalPatch>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .manager
        .commit(|ledger| GoalService::update(ledger, id, patch))?;
    Ok(Json(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Deleted>> {
    state.manager.commit(|ledger| GoalService::remove(ledger, id))?;
    Ok(Json(Deleted { ok: true }))
}

pub async fn add_to_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<DepositBody>,
) -> ApiResult<Json<DepositResponse>> {
    let now = state.clock.now();
    let goal = state
        .manager
        .commit(|ledger| GoalService::deposit(ledger, id, body.amount(), now))?;
    Ok(Json(DepositResponse {
        message: "added",
        current_amount: goal.current_amount,
    }))
}

pub async fn goal_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GoalProgress>> {
    let now = state.clock.now();
    let months = state.settings.savings_window_months;
    let progress = state
        .manager
        .read(|ledger| GoalService::progress(ledger, id, now, months))??;
    Ok(Json(progress))
}

pub async fn goal_contributions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<GoalContribution>>> {
    let contributions = state.manager.read(|ledger| {
        GoalService::contributions(ledger, id)
            .map(|found| found.into_iter().cloned().collect::<Vec<_>>())
    })??;
    Ok(Json(contributions))
}
