//! HTTP handlers for food and medicine consumption reports
//!
//! Creating, updating and deleting a report moves stock on the circle's
//! ledger row; see `ConsumptionService`.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::ConsumableKind;
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::services::consumption::{
    ConsumptionInput, ConsumptionOutcome, ConsumptionService, FoodReportInput, MedicineReportInput,
};
use crate::store::ConsumptionReport;
use crate::AppState;

fn service(state: &AppState, kind: ConsumableKind) -> ConsumptionService {
    ConsumptionService::new(state.ledger.clone(), kind)
        .with_restore_on_delete(state.config.ledger.restore_on_delete)
}

async fn create(
    state: AppState,
    kind: ConsumableKind,
    input: ConsumptionInput,
) -> AppResult<(StatusCode, Json<ConsumptionOutcome>)> {
    let outcome = service(&state, kind).create_report(input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn update(
    state: AppState,
    kind: ConsumableKind,
    id: Uuid,
    input: ConsumptionInput,
) -> AppResult<Json<ConsumptionOutcome>> {
    let outcome = service(&state, kind).update_report(id, input).await?;
    Ok(Json(outcome))
}

async fn delete(state: AppState, kind: ConsumableKind, id: Uuid) -> AppResult<StatusCode> {
    service(&state, kind).delete_report(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get(state: AppState, kind: ConsumableKind, id: Uuid) -> AppResult<Json<ConsumptionReport>> {
    let report = service(&state, kind).get_report(id).await?;
    Ok(Json(report))
}

async fn list(
    state: AppState,
    kind: ConsumableKind,
    daily_report_id: Uuid,
) -> AppResult<Json<Vec<ConsumptionReport>>> {
    let reports = service(&state, kind).list_reports(daily_report_id).await?;
    Ok(Json(reports))
}

/// Record food consumed on a daily report
pub async fn create_food_report(
    State(state): State<AppState>,
    AppJson(input): AppJson<FoodReportInput>,
) -> AppResult<(StatusCode, Json<ConsumptionOutcome>)> {
    create(state, ConsumableKind::Food, input.into()).await
}

pub async fn get_food_report(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ConsumptionReport>> {
    get(state, ConsumableKind::Food, id).await
}

pub async fn update_food_report(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<FoodReportInput>,
) -> AppResult<Json<ConsumptionOutcome>> {
    update(state, ConsumableKind::Food, id, input.into()).await
}

pub async fn delete_food_report(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    delete(state, ConsumableKind::Food, id).await
}

/// Food reports filed on one daily report
pub async fn list_food_reports(
    State(state): State<AppState>,
    AppPath(daily_report_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<ConsumptionReport>>> {
    list(state, ConsumableKind::Food, daily_report_id).await
}

/// Record medicine administered on a daily report
pub async fn create_medicine_report(
    State(state): State<AppState>,
    AppJson(input): AppJson<MedicineReportInput>,
) -> AppResult<(StatusCode, Json<ConsumptionOutcome>)> {
    create(state, ConsumableKind::Medicine, input.into()).await
}

pub async fn get_medicine_report(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ConsumptionReport>> {
    get(state, ConsumableKind::Medicine, id).await
}

pub async fn update_medicine_report(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<MedicineReportInput>,
) -> AppResult<Json<ConsumptionOutcome>> {
    update(state, ConsumableKind::Medicine, id, input.into()).await
}

pub async fn delete_medicine_report(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    delete(state, ConsumableKind::Medicine, id).await
}

/// Medicine reports filed on one daily report
pub async fn list_medicine_reports(
    State(state): State<AppState>,
    AppPath(daily_report_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<ConsumptionReport>>> {
    list(state, ConsumableKind::Medicine, daily_report_id).await
}
