use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::cards;

/// Validated card fields ready for persistence. Brand is already inferred.
#[derive(Debug, Clone)]
pub struct CardFields {
    pub card_number: String,
    pub holder_name: String,
    pub expiry: String,
    pub cvv: String,
    pub brand: Option<String>,
}

pub struct CardRepository {
    conn: DatabaseConnection,
}

impl CardRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: i32, fields: CardFields) -> Result<cards::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = cards::ActiveModel {
            user_id: Set(user_id),
            card_number: Set(fields.card_number),
            holder_name: Set(fields.holder_name),
            expiry: Set(fields.expiry),
            cvv: Set(fields.cvv),
            brand: Set(fields.brand),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert card")?;

        Ok(model)
    }

    /// Cards belonging to one user, newest first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<cards::Model>> {
        let rows = cards::Entity::find()
            .filter(cards::Column::UserId.eq(user_id))
            .order_by_desc(cards::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list cards for user")?;

        Ok(rows)
    }

    /// Fetch one card only if it belongs to the given user.
    pub async fn get_for_user(&self, user_id: i32, card_id: i32) -> Result<Option<cards::Model>> {
        let row = cards::Entity::find_by_id(card_id)
            .filter(cards::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query card")?;

        Ok(row)
    }

    /// Replace the stored fields. Returns `None` when the card is missing
    /// or owned by someone else.
    pub async fn update(
        &self,
        user_id: i32,
        card_id: i32,
        fields: CardFields,
    ) -> Result<Option<cards::Model>> {
        let Some(row) = self.get_for_user(user_id, card_id).await? else {
            return Ok(None);
        };

        let mut active: cards::ActiveModel = row.into();
        active.card_number = Set(fields.card_number);
        active.holder_name = Set(fields.holder_name);
        active.expiry = Set(fields.expiry);
        active.cvv = Set(fields.cvv);
        active.brand = Set(fields.brand);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(model))
    }

    pub async fn delete(&self, user_id: i32, card_id: i32) -> Result<bool> {
        let result = cards::Entity::delete_many()
            .filter(cards::Column::Id.eq(card_id))
            .filter(cards::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete card")?;

        Ok(result.rows_affected > 0)
    }
}
