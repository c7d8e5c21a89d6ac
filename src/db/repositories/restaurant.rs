use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{dishes, restaurants};

pub struct RestaurantRepository {
    conn: DatabaseConnection,
}

impl RestaurantRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<restaurants::Model>> {
        let rows = restaurants::Entity::find()
            .order_by_asc(restaurants::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list restaurants")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<restaurants::Model>> {
        let row = restaurants::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query restaurant")?;

        Ok(row)
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        address: &str,
        delivery_time_minutes: i32,
        image_url: Option<&str>,
    ) -> Result<restaurants::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = restaurants::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(ToString::to_string)),
            address: Set(address.to_string()),
            delivery_time_minutes: Set(delivery_time_minutes),
            image_url: Set(image_url.map(ToString::to_string)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert restaurant")?;

        Ok(model)
    }

    /// Partial update. Returns `None` when the restaurant does not exist.
    pub async fn update(
        &self,
        id: i32,
        name: Option<&str>,
        description: Option<&str>,
        address: Option<&str>,
        delivery_time_minutes: Option<i32>,
        image_url: Option<&str>,
    ) -> Result<Option<restaurants::Model>> {
        let Some(row) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: restaurants::ActiveModel = row.into();
        if let Some(name) = name {
            active.name = Set(name.to_string());
        }
        if let Some(description) = description {
            active.description = Set(Some(description.to_string()));
        }
        if let Some(address) = address {
            active.address = Set(address.to_string());
        }
        if let Some(minutes) = delivery_time_minutes {
            active.delivery_time_minutes = Set(minutes);
        }
        if let Some(image_url) = image_url {
            active.image_url = Set(Some(image_url.to_string()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(model))
    }

    /// Delete a restaurant. Its dishes go with it.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = restaurants::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete restaurant")?;

        Ok(result.rows_affected > 0)
    }
}

pub struct DishRepository {
    conn: DatabaseConnection,
}

impl DishRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<dishes::Model>> {
        let rows = dishes::Entity::find()
            .order_by_asc(dishes::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list dishes")?;

        Ok(rows)
    }

    pub async fn list_for_restaurant(&self, restaurant_id: i32) -> Result<Vec<dishes::Model>> {
        let rows = dishes::Entity::find()
            .filter(dishes::Column::RestaurantId.eq(restaurant_id))
            .order_by_asc(dishes::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list dishes for restaurant")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<dishes::Model>> {
        let row = dishes::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query dish")?;

        Ok(row)
    }

    pub async fn create(
        &self,
        restaurant_id: i32,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        category: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<dishes::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = dishes::ActiveModel {
            restaurant_id: Set(restaurant_id),
            name: Set(name.to_string()),
            description: Set(description.map(ToString::to_string)),
            price: Set(price),
            category: Set(category.map(ToString::to_string)),
            image_url: Set(image_url.map(ToString::to_string)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert dish")?;

        Ok(model)
    }

    /// Partial update. Returns `None` when the dish does not exist.
    pub async fn update(
        &self,
        id: i32,
        name: Option<&str>,
        description: Option<&str>,
        price: Option<Decimal>,
        category: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<dishes::Model>> {
        let Some(row) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: dishes::ActiveModel = row.into();
        if let Some(name) = name {
            active.name = Set(name.to_string());
        }
        if let Some(description) = description {
            active.description = Set(Some(description.to_string()));
        }
        if let Some(price) = price {
            active.price = Set(price);
        }
        if let Some(category) = category {
            active.category = Set(Some(category.to_string()));
        }
        if let Some(image_url) = image_url {
            active.image_url = Set(Some(image_url.to_string()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = dishes::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete dish")?;

        Ok(result.rows_affected > 0)
    }
}
