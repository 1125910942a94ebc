use axum::extract::State;
use finmate_core::{CategoryService, MergeOutcome};
use finmate_domain::{Category, CategoryDraft, CategoryPatch, CategoryQuery};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entries::Deleted;
use crate::api::{
    extract::{Json, Path, Query},
    ApiResult, AppState,
};

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub source_id: Uuid,
    pub target_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: MergeOutcome,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.manager.read(|ledger| {
        CategoryService::list(ledger, &query)
            .into_iter()
            .cloned()
            .collect()
    })?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> ApiResult<Json<Category>> {
    let category = state
        .manager
        .commit(|ledger| CategoryService::create(ledger, draft))?;
    Ok(Json(category))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    let category = state
        .manager
        .read(|ledger| CategoryService::get(ledger, id).cloned())??;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CategoryPatch>,
) -> ApiResult<Json<Category>> {
    let category = state
        .manager
        .commit(|ledger| CategoryService::update(ledger, id, patch))?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Deleted>> {
    state
        .manager
        .commit(|ledger| CategoryService::remove(ledger, id))?;
    Ok(Json(Deleted { ok: true }))
}

pub async fn merge_categories(
    State(state): State<AppState>,
    Json(request): Json<MergeRequest>,
) -> ApiResult<Json<MergeResponse>> {
    let (outcome, source, target) = state.manager.commit(|ledger| {
        let source = CategoryService::get(ledger, request.source_id)?.name.clone();
        let target = CategoryService::get(ledger, request.target_id)?.name.clone();
        let outcome = CategoryService::merge(ledger, request.source_id, request.target_id)?;
        Ok((outcome, source, target))
    })?;
    Ok(Json(MergeResponse {
        message: format!("Merged '{source}' into '{target}' successfully"),
        outcome,
    }))
}
