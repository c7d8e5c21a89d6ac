use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, DishDto, MessageResponse};

#[derive(Deserialize)]
pub struct CreateDishRequest {
    pub restaurant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDishRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// GET /dishes
pub async fn list_dishes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<DishDto>>>, ApiError> {
    let rows = state.store().list_dishes().await?;
    let dtos = rows.into_iter().map(DishDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /dishes/{id}
pub async fn get_dish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DishDto>>, ApiError> {
    validate_id("dish", id)?;

    let row = state
        .store()
        .get_dish(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Dish", id))?;

    Ok(Json(ApiResponse::success(DishDto::from(row))))
}

/// POST /dishes (admin)
pub async fn create_dish(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateDishRequest>,
) -> Result<Json<ApiResponse<DishDto>>, ApiError> {
    require_admin(&user)?;
    validate_id("restaurant", payload.restaurant_id)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Dish name cannot be empty"));
    }
    if payload.price <= Decimal::ZERO {
        return Err(ApiError::validation("Price must be greater than zero"));
    }

    if state
        .store()
        .get_restaurant(payload.restaurant_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Restaurant", payload.restaurant_id));
    }

    let row = state
        .store()
        .create_dish(
            payload.restaurant_id,
            payload.name.trim(),
            payload.description.as_deref(),
            payload.price,
            payload.category.as_deref(),
            payload.image_url.as_deref(),
        )
        .await?;

    tracing::info!(dish_id = row.id, name = %row.name, "Dish created");

    Ok(Json(ApiResponse::success(DishDto::from(row))))
}

/// PUT /dishes/{id} (admin)
pub async fn update_dish(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDishRequest>,
) -> Result<Json<ApiResponse<DishDto>>, ApiError> {
    require_admin(&user)?;
    validate_id("dish", id)?;

    if let Some(price) = payload.price
        && price <= Decimal::ZERO
    {
        return Err(ApiError::validation("Price must be greater than zero"));
    }

    let row = state
        .store()
        .update_dish(
            id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.price,
            payload.category.as_deref(),
            payload.image_url.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Dish", id))?;

    Ok(Json(ApiResponse::success(DishDto::from(row))))
}

/// DELETE /dishes/{id} (admin)
pub async fn delete_dish(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_admin(&user)?;
    validate_id("dish", id)?;

    if !state.store().delete_dish(id).await? {
        return Err(ApiError::not_found("Dish", id));
    }

    tracing::info!(dish_id = id, "Dish deleted");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Dish {id} deleted"),
    })))
}
