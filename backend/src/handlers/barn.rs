//! HTTP handlers for barn endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{ListQuery, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::barn::{Barn, BarnService, CreateBarnInput, UpdateBarnInput};
use crate::AppState;

/// List barns
pub async fn list_barns(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Barn>>> {
    let service = BarnService::new(state.db);
    let barns = service.list_barns(&query).await?;
    Ok(Json(barns))
}

/// Get a barn by ID
pub async fn get_barn(
    State(state): State<AppState>,
    AppPath(barn_id): AppPath<Uuid>,
) -> AppResult<Json<Barn>> {
    let service = BarnService::new(state.db);
    let barn = service.get_barn(barn_id).await?;
    Ok(Json(barn))
}

/// Create a barn
pub async fn create_barn(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateBarnInput>,
) -> AppResult<(StatusCode, Json<Barn>)> {
    let service = BarnService::new(state.db);
    let barn = service.create_barn(input).await?;
    Ok((StatusCode::CREATED, Json(barn)))
}

/// Update a barn
pub async fn update_barn(
    State(state): State<AppState>,
    AppPath(barn_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateBarnInput>,
) -> AppResult<Json<Barn>> {
    let service = BarnService::new(state.db);
    let barn = service.update_barn(barn_id, input).await?;
    Ok(Json(barn))
}

/// Delete a barn
pub async fn delete_barn(
    State(state): State<AppState>,
    AppPath(barn_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = BarnService::new(state.db);
    service.delete_barn(barn_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
