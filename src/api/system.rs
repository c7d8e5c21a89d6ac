use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub version: String,
    pub database: String,
    pub uptime_seconds: u64,
}

/// GET /health (public liveness probe)
pub async fn get_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    if let Err(e) = state.store().ping().await {
        tracing::error!("Database ping failed: {}", e);
        return Err(ApiError::DatabaseError(e.to_string()));
    }

    Ok(Json(ApiResponse::success(HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })))
}
