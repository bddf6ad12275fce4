//! HTTP handlers for barn plan endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{ListQuery, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::barn_plan::{
    BarnPlan, BarnPlanFilter, BarnPlanService, CreateBarnPlanInput, UpdateBarnPlanInput,
};
use crate::AppState;

/// List barn plans, optionally for one circle
pub async fn list_barn_plans(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<BarnPlanFilter>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<PaginatedResponse<BarnPlan>>> {
    let service = BarnPlanService::new(state.db);
    let plans = service.list_plans(&filter, &query).await?;
    Ok(Json(plans))
}

pub async fn get_barn_plan(
    State(state): State<AppState>,
    AppPath(plan_id): AppPath<Uuid>,
) -> AppResult<Json<BarnPlan>> {
    let service = BarnPlanService::new(state.db);
    let plan = service.get_plan(plan_id).await?;
    Ok(Json(plan))
}

pub async fn create_barn_plan(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateBarnPlanInput>,
) -> AppResult<(StatusCode, Json<BarnPlan>)> {
    let service = BarnPlanService::new(state.db);
    let plan = service.create_plan(input).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_barn_plan(
    State(state): State<AppState>,
    AppPath(plan_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateBarnPlanInput>,
) -> AppResult<Json<BarnPlan>> {
    let service = BarnPlanService::new(state.db);
    let plan = service.update_plan(plan_id, input).await?;
    Ok(Json(plan))
}

pub async fn delete_barn_plan(
    State(state): State<AppState>,
    AppPath(plan_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = BarnPlanService::new(state.db);
    service.delete_plan(plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
