//! HTTP handlers for livestock circle endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{ConsumableKind, ListQuery, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::circle::{
    ChangeStatusInput, CircleFilter, CircleService, CreateCircleInput, LivestockCircle,
    ProvisionStockInput, UpdateCircleInput,
};
use crate::store::StockLedgerEntry;
use crate::AppState;

/// List circles, optionally filtered by barn or status
pub async fn list_circles(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<CircleFilter>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<PaginatedResponse<LivestockCircle>>> {
    let service = CircleService::new(state.db);
    let circles = service.list_circles(&filter, &query).await?;
    Ok(Json(circles))
}

/// Get a circle by ID
pub async fn get_circle(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
) -> AppResult<Json<LivestockCircle>> {
    let service = CircleService::new(state.db);
    let circle = service.get_circle(circle_id).await?;
    Ok(Json(circle))
}

/// Create a circle
pub async fn create_circle(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCircleInput>,
) -> AppResult<(StatusCode, Json<LivestockCircle>)> {
    let service = CircleService::new(state.db);
    let circle = service.create_circle(input).await?;
    Ok((StatusCode::CREATED, Json(circle)))
}

/// Update a circle
pub async fn update_circle(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateCircleInput>,
) -> AppResult<Json<LivestockCircle>> {
    let service = CircleService::new(state.db);
    let circle = service.update_circle(circle_id, input).await?;
    Ok(Json(circle))
}

/// Move a circle to another status
pub async fn change_circle_status(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
    AppJson(input): AppJson<ChangeStatusInput>,
) -> AppResult<Json<LivestockCircle>> {
    let service = CircleService::new(state.db);
    let circle = service.change_status(circle_id, input.status).await?;
    Ok(Json(circle))
}

/// Delete a circle
pub async fn delete_circle(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = CircleService::new(state.db);
    service.delete_circle(circle_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Food stock of a circle
pub async fn list_circle_foods(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<StockLedgerEntry>>> {
    let service = CircleService::new(state.db);
    let stock = service.list_stock(circle_id, ConsumableKind::Food).await?;
    Ok(Json(stock))
}

/// Provision a circle with food
pub async fn provision_circle_food(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
    AppJson(input): AppJson<ProvisionStockInput>,
) -> AppResult<(StatusCode, Json<StockLedgerEntry>)> {
    let service = CircleService::new(state.db);
    let entry = service
        .provision_stock(circle_id, ConsumableKind::Food, input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Medicine stock of a circle
pub async fn list_circle_medicines(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<StockLedgerEntry>>> {
    let service = CircleService::new(state.db);
    let stock = service.list_stock(circle_id, ConsumableKind::Medicine).await?;
    Ok(Json(stock))
}

/// Provision a circle with medicine
pub async fn provision_circle_medicine(
    State(state): State<AppState>,
    AppPath(circle_id): AppPath<Uuid>,
    AppJson(input): AppJson<ProvisionStockInput>,
) -> AppResult<(StatusCode, Json<StockLedgerEntry>)> {
    let service = CircleService::new(state.db);
    let entry = service
        .provision_stock(circle_id, ConsumableKind::Medicine, input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
