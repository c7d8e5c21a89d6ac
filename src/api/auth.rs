use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::User;
use crate::models::Role;
use crate::services::{LoginResult, ProfileView, RegistrationResult};

const SESSION_USER_KEY: &str = "user_id";

/// Authenticated caller, resolved once by the middleware and attached to
/// the request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub is_superuser: bool,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_superuser || matches!(self.role, Role::Admin)
    }
}

/// Rejects non-admin callers on admin-only surface.
pub fn require_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required".to_string()))
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_user(&state, &headers, &session).await?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

async fn resolve_user(
    state: &AppState,
    headers: &HeaderMap,
    session: &Session,
) -> Result<CurrentUser, ApiError> {
    // Session first (fastest path for browser clients).
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await
        && let Ok(Some(user)) = state.store().get_user_by_id(user_id).await
        && user.is_active
    {
        return current_user(state, user).await;
    }

    if let Some(key) = extract_api_key(headers)
        && let Ok(Some(user)) = state.store().verify_api_key(&key).await
        && user.is_active
    {
        return current_user(state, user).await;
    }

    Err(ApiError::Unauthorized("Not authenticated".to_string()))
}

async fn current_user(state: &AppState, user: User) -> Result<CurrentUser, ApiError> {
    let profile = state.store().get_profile(user.id).await?;
    let role = profile
        .and_then(|p| Role::parse(&p.role))
        .unwrap_or(Role::Customer);

    Ok(CurrentUser {
        id: user.id,
        email: user.email,
        role,
        is_superuser: user.is_superuser,
    })
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Creates an inactive account and mails a verification code.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegistrationResult>>, ApiError> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::validation("A valid email is required"));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    let result = state
        .accounts()
        .register(payload.email.trim(), &payload.password, payload.name.trim())
        .await?;

    tracing::info!(email = %result.email, "Registered new account, verification pending");

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/verify-email
/// Consumes the one-time code and activates the account.
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    let profile = state
        .accounts()
        .verify_email(payload.email.trim(), payload.code.trim())
        .await?;

    tracing::info!(email = %profile.email, "Account verified and activated");

    Ok(Json(ApiResponse::success(profile)))
}

/// POST /auth/login
/// Authenticate with email and password, returns the API key on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .accounts()
        .login(&payload.email, &payload.password)
        .await?;

    session
        .insert(SESSION_USER_KEY, result.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
/// Invalidate the current session.
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to destroy session: {e}")))?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    })))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.new_password != payload.confirm_password {
        return Err(ApiError::validation("Password confirmation does not match"));
    }

    state
        .accounts()
        .change_password(user.id, &payload.old_password, &payload.new_password)
        .await?;

    tracing::info!(user_id = user.id, "Password changed");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}
