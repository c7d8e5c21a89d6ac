use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_card_payload, validate_id};
use super::{ApiError, ApiResponse, AppState, CardDto, CardPayload, MessageResponse};

/// GET /cards
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<CardDto>>>, ApiError> {
    let rows = state.store().list_cards_for_user(user.id).await?;
    let dtos = rows.into_iter().map(CardDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /cards
/// Validates every field before persisting; brand is inferred from the
/// number prefix, never taken from the caller.
pub async fn add_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CardPayload>,
) -> Result<Json<ApiResponse<CardDto>>, ApiError> {
    let fields = validate_card_payload(&payload)?;

    let row = state.store().create_card(user.id, fields).await?;

    tracing::info!(card_id = row.id, user_id = user.id, "Card stored");

    Ok(Json(ApiResponse::success(CardDto::from(row))))
}

/// GET /cards/{id}
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CardDto>>, ApiError> {
    validate_id("card", id)?;

    let row = state
        .store()
        .get_card_for_user(user.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card", id))?;

    Ok(Json(ApiResponse::success(CardDto::from(row))))
}

/// PUT /cards/{id}
/// Re-validates and re-infers the brand. A card owned by someone else
/// reads as not found.
pub async fn update_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<CardPayload>,
) -> Result<Json<ApiResponse<CardDto>>, ApiError> {
    validate_id("card", id)?;
    let fields = validate_card_payload(&payload)?;

    let row = state
        .store()
        .update_card(user.id, id, fields)
        .await?
        .ok_or_else(|| ApiError::not_found("Card", id))?;

    Ok(Json(ApiResponse::success(CardDto::from(row))))
}

/// DELETE /cards/{id}
pub async fn delete_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("card", id)?;

    if !state.store().delete_card(user.id, id).await? {
        return Err(ApiError::not_found("Card", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Card {id} deleted"),
    })))
}
