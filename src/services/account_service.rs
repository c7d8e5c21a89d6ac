//! Domain service for accounts: registration, email verification, login,
//! profile updates, password changes, and user administration.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Account is already verified")]
    AlreadyVerified,

    #[error("Verification code has expired")]
    CodeExpired,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Mail dispatch failed: {0}")]
    MailDispatch(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration result for the new, still-inactive account.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResult {
    pub id: i32,
    pub email: String,
    pub name: String,
}

/// Login result containing identity, effective role and API key.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub api_key: String,
}

/// Merged user + profile view.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_verified: bool,
}

/// Row in the admin user listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Partial profile update. `None` fields stay untouched. Role and
/// verification state have no place here on purpose.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates an inactive user with a pending verification code and mails
    /// the code. A failed dispatch rolls the registration back.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::EmailTaken`] for duplicate emails and
    /// [`AccountError::MailDispatch`] when the code could not be sent.
    async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<RegistrationResult, AccountError>;

    /// Consumes a verification code, activating the account on success.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UserNotFound`], [`AccountError::AlreadyVerified`],
    /// [`AccountError::CodeExpired`] or [`AccountError::InvalidCode`].
    async fn verify_email(&self, email: &str, code: &str) -> Result<ProfileView, AccountError>;

    /// Verifies credentials. Inactive accounts fail exactly like bad
    /// passwords so the two cannot be told apart.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AccountError>;

    async fn get_profile(&self, user_id: i32) -> Result<ProfileView, AccountError>;

    /// Partially updates identity and contact fields.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::EmailTaken`] when the target email belongs
    /// to another account.
    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<ProfileView, AccountError>;

    /// Changes a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] if the current password
    /// is wrong and [`AccountError::Validation`] if the new one is invalid.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;

    /// All users with their roles. Admin only at the boundary.
    async fn list_users(&self) -> Result<Vec<UserSummary>, AccountError>;

    /// Flips a user's active flag. Superusers cannot be deactivated.
    async fn toggle_active(&self, user_id: i32) -> Result<UserSummary, AccountError>;
}
