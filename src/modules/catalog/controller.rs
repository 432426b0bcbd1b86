use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use validator::Validate;

use crate::modules::catalog::model::{Item, ItemDto, ItemFilterParams};
use crate::state::AppState;
use crate::utils::errors::AppError;

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    Path(family): Path<String>,
    Query(filters): Query<ItemFilterParams>,
) -> Json<Vec<Item>> {
    Json(state.catalog.list(&family, &filters))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    Path((family, id)): Path<(String, u64)>,
) -> Result<Json<Item>, AppError> {
    state
        .catalog
        .get(&family, id)
        .map(Json)
        .ok_or_else(|| AppError::not_found(anyhow!("{} {} not found", family, id)))
}

#[instrument(skip(state))]
pub async fn create_item(
    State(state): State<AppState>,
    Path(family): Path<String>,
    Json(dto): Json<ItemDto>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    dto.validate().map_err(AppError::unprocessable)?;

    let item = state.catalog.create(&family, dto);

    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    Path((family, id)): Path<(String, u64)>,
    Json(dto): Json<ItemDto>,
) -> Result<Json<Item>, AppError> {
    dto.validate().map_err(AppError::unprocessable)?;

    state
        .catalog
        .update(&family, id, dto)
        .map(Json)
        .ok_or_else(|| AppError::not_found(anyhow!("{} {} not found", family, id)))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((family, id)): Path<(String, u64)>,
) -> Result<StatusCode, AppError> {
    if state.catalog.delete(&family, id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(anyhow!("{} {} not found", family, id)))
    }
}
