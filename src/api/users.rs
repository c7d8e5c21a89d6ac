use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::services::UserSummary;

/// GET /users (admin)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    require_admin(&user)?;

    let users = state.accounts().list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// POST /users/{id}/toggle-active (admin)
/// Flips the active flag. Superusers cannot be deactivated.
pub async fn toggle_active(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    require_admin(&user)?;
    validate_id("user", id)?;

    let summary = state.accounts().toggle_active(id).await?;

    tracing::info!(
        target_user_id = id,
        is_active = summary.is_active,
        "User active flag toggled"
    );

    Ok(Json(ApiResponse::success(summary)))
}
