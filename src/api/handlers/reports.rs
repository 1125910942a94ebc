use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use finmate_core::{ExportFormat, MonthReport, ProjectedMonthEnd, ReportService, Summary};
use serde::Deserialize;

use crate::api::{
    extract::{Json, Query},
    ApiResult, AppState,
};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub year: i32,
    pub month: u32,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".into()
}

pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<Summary>> {
    let summary = state.manager.read(ReportService::summary)?;
    Ok(Json(summary))
}

pub async fn projected_eom(State(state): State<AppState>) -> ApiResult<Json<ProjectedMonthEnd>> {
    let now = state.clock.now();
    let projection = state
        .manager
        .read(|ledger| ReportService::projected_eom(ledger, now))??;
    Ok(Json(projection))
}

pub async fn month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<MonthReport>> {
    let report = state
        .manager
        .read(|ledger| ReportService::month(ledger, query.year, query.month))??;
    Ok(Json(report))
}

pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let format: ExportFormat = query.format.parse()?;
    let currency = state.settings.display_currency.as_str();
    let file = state.manager.read(|ledger| {
        ReportService::export(ledger, query.year, query.month, format, currency)
    })??;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
