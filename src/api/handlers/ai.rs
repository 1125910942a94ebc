//! Classifier endpoints: merchant categorisation and recurring-charge checks.

use axum::extract::State;
use finmate_core::{
    CategoryConfirmation, Classifier, Prediction, PredictionRequest, RecurringRequest,
    RecurringVerdict,
};
use finmate_domain::{MerchantFeedback, RecurringSeries};

use crate::api::{
    extract::Json,
    ApiResult, AppState,
};

pub async fn predict_category(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> ApiResult<Json<Prediction>> {
    let prediction = state
        .manager
        .read(|ledger| Classifier::predict_category(ledger, &request))?;
    Ok(Json(prediction))
}

pub async fn confirm_category(
    State(state): State<AppState>,
    Json(confirmation): Json<CategoryConfirmation>,
) -> ApiResult<Json<MerchantFeedback>> {
    let now = state.clock.now();
    let feedback = state
        .manager
        .commit(|ledger| Classifier::confirm_category(ledger, confirmation, now))?;
    Ok(Json(feedback))
}

pub async fn recurring_check(
    State(state): State<AppState>,
    Json(request): Json<RecurringRequest>,
) -> ApiResult<Json<RecurringVerdict>> {
    let verdict = state
        .manager
        .read(|ledger| Classifier::recurring_check(ledger, &request))?;
    Ok(Json(verdict))
}

pub async fn recurring_confirm(
    State(state): State<AppState>,
    Json(request): Json<RecurringRequest>,
) -> ApiResult<Json<RecurringSeries>> {
    let now = state.clock.now();
    let series = state
        .manager
        .commit(|ledger| Classifier::recurring_confirm(ledger, &request, now))?;
    Ok(Json(series))
}
