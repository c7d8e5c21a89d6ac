use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{ProfileUpdate, ProfileView};

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    let profile = state.accounts().get_profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /profile
/// Partial update of identity and contact fields. Role and verification
/// state are not client-settable and have no place in the payload.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    if let Some(email) = payload.email.as_deref()
        && (email.trim().is_empty() || !email.contains('@'))
    {
        return Err(ApiError::validation("A valid email is required"));
    }
    if let Some(name) = payload.name.as_deref()
        && name.trim().is_empty()
    {
        return Err(ApiError::validation("Name cannot be empty"));
    }

    let update = ProfileUpdate {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
    };

    let profile = state.accounts().update_profile(user.id, update).await?;
    Ok(Json(ApiResponse::success(profile)))
}
