use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::profiles;
use crate::models::Role;

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create the 1:1 profile for a freshly registered user.
    pub async fn create(&self, user_id: i32, role: Role) -> Result<profiles::Model> {
        let active = profiles::ActiveModel {
            user_id: Set(user_id),
            role: Set(role.as_str().to_string()),
            is_verified: Set(false),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert profile")?;

        Ok(model)
    }

    pub async fn get_by_user_id(&self, user_id: i32) -> Result<Option<profiles::Model>> {
        let profile = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile by user ID")?;

        Ok(profile)
    }

    /// Arm a fresh verification code. Code and expiry are always written together.
    pub async fn set_verification_code(
        &self,
        user_id: i32,
        code: &str,
        expiry: &str,
    ) -> Result<()> {
        let profile = self
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile not found for user {user_id}"))?;

        let mut active: profiles::ActiveModel = profile.into();
        active.verification_code = Set(Some(code.to_string()));
        active.code_expiry = Set(Some(expiry.to_string()));
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Flip the profile to verified and burn the one-time code.
    pub async fn mark_verified(&self, user_id: i32) -> Result<()> {
        let profile = self
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile not found for user {user_id}"))?;

        let mut active: profiles::ActiveModel = profile.into();
        active.is_verified = Set(true);
        active.verification_code = Set(None);
        active.code_expiry = Set(None);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Partially update contact fields. `None` leaves a field untouched.
    pub async fn update_contact(
        &self,
        user_id: i32,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<profiles::Model> {
        let profile = self
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile not found for user {user_id}"))?;

        let mut active: profiles::ActiveModel = profile.into();
        if let Some(phone) = phone {
            active.phone = Set(Some(phone.to_string()));
        }
        if let Some(address) = address {
            active.address = Set(Some(address.to_string()));
        }

        let model = active.update(&self.conn).await?;
        Ok(model)
    }
}
