use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, DishDto, MessageResponse, RestaurantDto};

#[derive(Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub delivery_time_minutes: i32,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub delivery_time_minutes: Option<i32>,
    pub image_url: Option<String>,
}

/// GET /restaurants
pub async fn list_restaurants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RestaurantDto>>>, ApiError> {
    let rows = state.store().list_restaurants().await?;
    let dtos = rows.into_iter().map(RestaurantDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /restaurants/{id}
pub async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RestaurantDto>>, ApiError> {
    validate_id("restaurant", id)?;

    let row = state
        .store()
        .get_restaurant(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Restaurant", id))?;

    Ok(Json(ApiResponse::success(RestaurantDto::from(row))))
}

/// GET /restaurants/{id}/dishes
pub async fn list_restaurant_dishes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<DishDto>>>, ApiError> {
    validate_id("restaurant", id)?;

    if state.store().get_restaurant(id).await?.is_none() {
        return Err(ApiError::not_found("Restaurant", id));
    }

    let rows = state.store().list_dishes_for_restaurant(id).await?;
    let dtos = rows.into_iter().map(DishDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /restaurants (admin)
pub async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<Json<ApiResponse<RestaurantDto>>, ApiError> {
    require_admin(&user)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Restaurant name cannot be empty"));
    }
    if payload.delivery_time_minutes <= 0 {
        return Err(ApiError::validation(
            "Delivery time must be a positive number of minutes",
        ));
    }

    let row = state
        .store()
        .create_restaurant(
            payload.name.trim(),
            payload.description.as_deref(),
            &payload.address,
            payload.delivery_time_minutes,
            payload.image_url.as_deref(),
        )
        .await?;

    tracing::info!(restaurant_id = row.id, name = %row.name, "Restaurant created");

    Ok(Json(ApiResponse::success(RestaurantDto::from(row))))
}

/// PUT /restaurants/{id} (admin)
pub async fn update_restaurant(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> Result<Json<ApiResponse<RestaurantDto>>, ApiError> {
    require_admin(&user)?;
    validate_id("restaurant", id)?;

    if let Some(minutes) = payload.delivery_time_minutes
        && minutes <= 0
    {
        return Err(ApiError::validation(
            "Delivery time must be a positive number of minutes",
        ));
    }

    let row = state
        .store()
        .update_restaurant(
            id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.address.as_deref(),
            payload.delivery_time_minutes,
            payload.image_url.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Restaurant", id))?;

    Ok(Json(ApiResponse::success(RestaurantDto::from(row))))
}

/// DELETE /restaurants/{id} (admin). Dishes cascade with it.
pub async fn delete_restaurant(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_admin(&user)?;
    validate_id("restaurant", id)?;

    if !state.store().delete_restaurant(id).await? {
        return Err(ApiError::not_found("Restaurant", id));
    }

    tracing::info!(restaurant_id = id, "Restaurant deleted");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Restaurant {id} deleted"),
    })))
}
