//! HTTP handlers for breed endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{ListQuery, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::breed::{Breed, BreedService, CreateBreedInput, UpdateBreedInput};
use crate::AppState;

/// List breeds
pub async fn list_breeds(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Breed>>> {
    let service = BreedService::new(state.db);
    let breeds = service.list_breeds(&query).await?;
    Ok(Json(breeds))
}

/// Get a breed by ID
pub async fn get_breed(
    State(state): State<AppState>,
    AppPath(breed_id): AppPath<Uuid>,
) -> AppResult<Json<Breed>> {
    let service = BreedService::new(state.db);
    let breed = service.get_breed(breed_id).await?;
    Ok(Json(breed))
}

/// Create a breed
pub async fn create_breed(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateBreedInput>,
) -> AppResult<(StatusCode, Json<Breed>)> {
    let service = BreedService::new(state.db);
    let breed = service.create_breed(input).await?;
    Ok((StatusCode::CREATED, Json(breed)))
}

/// Update a breed
pub async fn update_breed(
    State(state): State<AppState>,
    AppPath(breed_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateBreedInput>,
) -> AppResult<Json<Breed>> {
    let service = BreedService::new(state.db);
    let breed = service.update_breed(breed_id, input).await?;
    Ok(Json(breed))
}

/// Delete a breed
pub async fn delete_breed(
    State(state): State<AppState>,
    AppPath(breed_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = BreedService::new(state.db);
    service.delete_breed(breed_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
