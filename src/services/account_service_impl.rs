//! `SeaORM` implementation of the `AccountService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task;
use tracing::error;

use crate::config::Config;
use crate::constants::{auth, verification};
use crate::db::repositories::user::hash_password;
use crate::db::{Store, User};
use crate::entities::profiles;
use crate::models::Role;
use crate::services::account_service::{
    AccountError, AccountService, LoginResult, ProfileUpdate, ProfileView, RegistrationResult,
    UserSummary,
};
use crate::services::mailer::{Mailer, generate_verification_code};

pub struct SeaOrmAccountService {
    store: Store,
    config: Arc<RwLock<Config>>,
    mailer: Arc<dyn Mailer>,
}

impl SeaOrmAccountService {
    #[must_use]
    pub fn new(store: Store, config: Arc<RwLock<Config>>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            config,
            mailer,
        }
    }

    /// Superusers act as admins regardless of their stored profile role.
    fn effective_role(user: &User, profile: Option<&profiles::Model>) -> String {
        if user.is_superuser {
            return Role::Admin.as_str().to_string();
        }
        profile.map_or_else(
            || Role::Customer.as_str().to_string(),
            |p| p.role.clone(),
        )
    }

    fn profile_view(user: &User, profile: Option<&profiles::Model>) -> ProfileView {
        ProfileView {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: Self::effective_role(user, profile),
            phone: profile.and_then(|p| p.phone.clone()),
            address: profile.and_then(|p| p.address.clone()),
            is_verified: profile.is_some_and(|p| p.is_verified),
        }
    }

    async fn hash_with_config(&self, password: &str) -> Result<String, AccountError> {
        let security = self.config.read().await.security.clone();
        let password = password.to_string();

        let hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AccountError::Internal(format!("Hashing task panicked: {e}")))??;

        Ok(hash)
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<RegistrationResult, AccountError> {
        if password.len() < auth::MIN_PASSWORD_LEN {
            return Err(AccountError::Validation(format!(
                "Password must be at least {} characters",
                auth::MIN_PASSWORD_LEN
            )));
        }

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.hash_with_config(password).await?;
        let user = self.store.create_user(email, name, &password_hash).await?;
        self.store.create_profile(user.id, Role::Customer).await?;

        let code = generate_verification_code();
        let expiry = (chrono::Utc::now()
            + chrono::Duration::minutes(verification::CODE_TTL_MINUTES))
        .to_rfc3339();
        self.store
            .set_verification_code(user.id, &code, &expiry)
            .await?;

        let body = format!(
            "Hello {name},\n\nYour verification code is {code}. \
             It expires in {} minutes.\n",
            verification::CODE_TTL_MINUTES
        );

        if let Err(e) = self
            .mailer
            .send(email, verification::MAIL_SUBJECT, &body)
            .await
        {
            // Compensating rollback: do not strand an unusable inactive account.
            if let Err(del_err) = self.store.delete_user(user.id).await {
                error!(
                    "Failed to roll back registration for {}: {}",
                    email, del_err
                );
            }
            return Err(AccountError::MailDispatch(e.to_string()));
        }

        Ok(RegistrationResult {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }

    async fn verify_email(&self, email: &str, code: &str) -> Result<ProfileView, AccountError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let profile = self
            .store
            .get_profile(user.id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        if profile.is_verified {
            return Err(AccountError::AlreadyVerified);
        }

        let (Some(stored_code), Some(expiry)) =
            (profile.verification_code.as_deref(), profile.code_expiry.as_deref())
        else {
            return Err(AccountError::InvalidCode);
        };

        let expiry = chrono::DateTime::parse_from_rfc3339(expiry)
            .map_err(|e| AccountError::Internal(format!("Malformed code expiry: {e}")))?;
        if chrono::Utc::now() > expiry {
            return Err(AccountError::CodeExpired);
        }

        if stored_code != code {
            return Err(AccountError::InvalidCode);
        }

        self.store.set_user_active(user.id, true).await?;
        self.store.mark_profile_verified(user.id).await?;

        self.get_profile(user.id).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AccountError> {
        let is_valid = self.store.verify_password(email, password).await?;
        if !is_valid {
            return Err(AccountError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        // Unverified accounts are indistinguishable from bad passwords.
        if !user.is_active {
            return Err(AccountError::InvalidCredentials);
        }

        let profile = self.store.get_profile(user.id).await?;

        Ok(LoginResult {
            id: user.id,
            role: Self::effective_role(&user, profile.as_ref()),
            name: user.name,
            email: user.email,
            api_key: user.api_key,
        })
    }

    async fn get_profile(&self, user_id: i32) -> Result<ProfileView, AccountError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let profile = self.store.get_profile(user_id).await?;

        Ok(Self::profile_view(&user, profile.as_ref()))
    }

    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<ProfileView, AccountError> {
        if let Some(new_email) = update.email.as_deref() {
            if let Some(existing) = self.store.get_user_by_email(new_email).await? {
                if existing.id != user_id {
                    return Err(AccountError::EmailTaken);
                }
            }
        }

        if self.store.get_user_by_id(user_id).await?.is_none() {
            return Err(AccountError::UserNotFound);
        }

        if update.name.is_some() || update.email.is_some() {
            self.store
                .update_user_identity(user_id, update.name.as_deref(), update.email.as_deref())
                .await?;
        }

        if update.phone.is_some() || update.address.is_some() {
            self.store
                .update_profile_contact(user_id, update.phone.as_deref(), update.address.as_deref())
                .await?;
        }

        self.get_profile(user_id).await
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        if new_password.len() < auth::MIN_PASSWORD_LEN {
            return Err(AccountError::Validation(format!(
                "New password must be at least {} characters",
                auth::MIN_PASSWORD_LEN
            )));
        }

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let is_valid = self
            .store
            .verify_password(&user.email, current_password)
            .await?;
        if !is_valid {
            return Err(AccountError::InvalidCredentials);
        }

        let security = self.config.read().await.security.clone();
        self.store
            .update_password(user_id, new_password, Some(&security))
            .await?;

        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, AccountError> {
        let rows = self.store.list_users_with_profiles().await?;

        Ok(rows
            .into_iter()
            .map(|(user, profile)| UserSummary {
                id: user.id,
                role: Self::effective_role(&user, profile.as_ref()),
                email: user.email,
                name: user.name,
                is_active: user.is_active,
                is_superuser: user.is_superuser,
            })
            .collect())
    }

    async fn toggle_active(&self, user_id: i32) -> Result<UserSummary, AccountError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        if user.is_superuser && user.is_active {
            return Err(AccountError::Validation(
                "Cannot deactivate a superuser".to_string(),
            ));
        }

        self.store.set_user_active(user_id, !user.is_active).await?;

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;
        let profile = self.store.get_profile(user_id).await?;

        Ok(UserSummary {
            id: user.id,
            role: Self::effective_role(&user, profile.as_ref()),
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
        })
    }
}
