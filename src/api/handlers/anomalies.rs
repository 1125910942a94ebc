use axum::extract::State;
use chrono::NaiveDate;
use finmate_core::{AnomalyService, ScanOutcome, DEFAULT_SCAN_DAYS, DEFAULT_SNOOZE_DAYS};
use finmate_domain::Anomaly;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{
    extract::{Json, Path, Query},
    ApiResult, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_dismissed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnomalyAck {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

pub async fn list_anomalies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Anomaly>>> {
    let anomalies = state.manager.read(|ledger| {
        AnomalyService::list(ledger, query.include_dismissed)
            .into_iter()
            .cloned()
            .collect()
    })?;
    Ok(Json(anomalies))
}

pub async fn scan(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> ApiResult<Json<ScanOutcome>> {
    let now = state.clock.now();
    let days = query.days.unwrap_or(DEFAULT_SCAN_DAYS);
    let threshold = state.settings.anomaly_threshold;
    let outcome = state
        .manager
        .commit(|ledger| AnomalyService::scan(ledger, now, days, threshold))?;
    Ok(Json(outcome))
}

pub async fn dismiss(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AnomalyAck>> {
    state
        .manager
        .commit(|ledger| AnomalyService::dismiss(ledger, id))?;
    Ok(Json(AnomalyAck {
        message: "dismissed",
        until: None,
    }))
}

pub async fn snooze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DaysQuery>,
) -> ApiResult<Json<AnomalyAck>> {
    let today = state.clock.today();
    let days = query.days.unwrap_or(DEFAULT_SNOOZE_DAYS);
    let anomaly = state
        .manager
        .commit(|ledger| AnomalyService::snooze(ledger, id, days, today))?;
    Ok(Json(AnomalyAck {
        message: "snoozed",
        until: anomaly.snoozed_until,
    }))
}
