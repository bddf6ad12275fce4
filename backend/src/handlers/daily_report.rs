//! HTTP handlers for daily report endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{ListQuery, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::daily_report::{
    CreateDailyReportInput, DailyReport, DailyReportFilter, DailyReportService,
    UpdateDailyReportInput,
};
use crate::AppState;

/// List daily reports
pub async fn list_daily_reports(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<DailyReportFilter>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<PaginatedResponse<DailyReport>>> {
    let service = DailyReportService::new(state.db);
    let reports = service.list_reports(&filter, &query).await?;
    Ok(Json(reports))
}

pub async fn get_daily_report(
    State(state): State<AppState>,
    AppPath(report_id): AppPath<Uuid>,
) -> AppResult<Json<DailyReport>> {
    let service = DailyReportService::new(state.db);
    let report = service.get_report(report_id).await?;
    Ok(Json(report))
}

pub async fn create_daily_report(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateDailyReportInput>,
) -> AppResult<(StatusCode, Json<DailyReport>)> {
    let service = DailyReportService::new(state.db);
    let report = service.create_report(input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn update_daily_report(
    State(state): State<AppState>,
    AppPath(report_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateDailyReportInput>,
) -> AppResult<Json<DailyReport>> {
    let service = DailyReportService::new(state.db);
    let report = service.update_report(report_id, input).await?;
    Ok(Json(report))
}

pub async fn delete_daily_report(
    State(state): State<AppState>,
    AppPath(report_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = DailyReportService::new(state.db);
    service.delete_report(report_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
