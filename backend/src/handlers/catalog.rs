//! HTTP handlers for the food and medicine catalogs
//!
//! Both catalogs share `CatalogService`; the per-kind handlers only pick
//! which table the service works on.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{ConsumableKind, ListQuery, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::catalog::{
    CatalogItem, CatalogService, CreateCatalogItemInput, UpdateCatalogItemInput,
};
use crate::AppState;

async fn list_items(
    state: AppState,
    kind: ConsumableKind,
    query: ListQuery,
) -> AppResult<Json<PaginatedResponse<CatalogItem>>> {
    let service = CatalogService::new(state.db, kind);
    let items = service.list_items(&query).await?;
    Ok(Json(items))
}

async fn get_item(state: AppState, kind: ConsumableKind, item_id: Uuid) -> AppResult<Json<CatalogItem>> {
    let service = CatalogService::new(state.db, kind);
    let item = service.get_item(item_id).await?;
    Ok(Json(item))
}

async fn create_item(
    state: AppState,
    kind: ConsumableKind,
    input: CreateCatalogItemInput,
) -> AppResult<(StatusCode, Json<CatalogItem>)> {
    let service = CatalogService::new(state.db, kind);
    let item = service.create_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    state: AppState,
    kind: ConsumableKind,
    item_id: Uuid,
    input: UpdateCatalogItemInput,
) -> AppResult<Json<CatalogItem>> {
    let service = CatalogService::new(state.db, kind);
    let item = service.update_item(item_id, input).await?;
    Ok(Json(item))
}

async fn delete_item(state: AppState, kind: ConsumableKind, item_id: Uuid) -> AppResult<StatusCode> {
    let service = CatalogService::new(state.db, kind);
    service.delete_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List foods
pub async fn list_foods(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<PaginatedResponse<CatalogItem>>> {
    list_items(state, ConsumableKind::Food, query).await
}

/// Get a food by ID
pub async fn get_food(
    State(state): State<AppState>,
    AppPath(food_id): AppPath<Uuid>,
) -> AppResult<Json<CatalogItem>> {
    get_item(state, ConsumableKind::Food, food_id).await
}

/// Create a food
pub async fn create_food(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCatalogItemInput>,
) -> AppResult<(StatusCode, Json<CatalogItem>)> {
    create_item(state, ConsumableKind::Food, input).await
}

/// Update a food
pub async fn update_food(
    State(state): State<AppState>,
    AppPath(food_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateCatalogItemInput>,
) -> AppResult<Json<CatalogItem>> {
    update_item(state, ConsumableKind::Food, food_id, input).await
}

/// Delete a food
pub async fn delete_food(
    State(state): State<AppState>,
    AppPath(food_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    delete_item(state, ConsumableKind::Food, food_id).await
}

/// List medicines
pub async fn list_medicines(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<PaginatedResponse<CatalogItem>>> {
    list_items(state, ConsumableKind::Medicine, query).await
}

/// Get a medicine by ID
pub async fn get_medicine(
    State(state): State<AppState>,
    AppPath(medicine_id): AppPath<Uuid>,
) -> AppResult<Json<CatalogItem>> {
    get_item(state, ConsumableKind::Medicine, medicine_id).await
}

/// Create a medicine
pub async fn create_medicine(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCatalogItemInput>,
) -> AppResult<(StatusCode, Json<CatalogItem>)> {
    create_item(state, ConsumableKind::Medicine, input).await
}

/// Update a medicine
pub async fn update_medicine(
    State(state): State<AppState>,
    AppPath(medicine_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateCatalogItemInput>,
) -> AppResult<Json<CatalogItem>> {
    update_item(state, ConsumableKind::Medicine, medicine_id, input).await
}

/// Delete a medicine
pub async fn delete_medicine(
    State(state): State<AppState>,
    AppPath(medicine_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    delete_item(state, ConsumableKind::Medicine, medicine_id).await
}
