use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{order_items, orders};
use crate::models::{OrderStatus, PaymentMethod};

/// One resolved line of a new order: dish, quantity, snapshot price.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub dish_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Persist the order header and its line items as one transaction.
    /// Either everything lands or nothing does.
    pub async fn create_with_items(
        &self,
        user_id: i32,
        payment_method: PaymentMethod,
        total: Decimal,
        lines: &[NewOrderLine],
    ) -> Result<orders::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let txn = self.conn.begin().await?;

        let order = orders::ActiveModel {
            user_id: Set(user_id),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            payment_method: Set(payment_method.as_str().to_string()),
            total: Set(total),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert order")?;

        let items: Vec<order_items::ActiveModel> = lines
            .iter()
            .map(|line| order_items::ActiveModel {
                order_id: Set(order.id),
                dish_id: Set(line.dish_id),
                quantity: Set(line.quantity),
                price: Set(line.price),
                ..Default::default()
            })
            .collect();

        order_items::Entity::insert_many(items)
            .exec(&txn)
            .await
            .context("Failed to insert order items")?;

        txn.commit().await?;

        Ok(order)
    }

    /// Orders belonging to one user, newest first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<orders::Model>> {
        let rows = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list orders for user")?;

        Ok(rows)
    }

    /// Every order in the system, newest first.
    pub async fn list_all(&self) -> Result<Vec<orders::Model>> {
        let rows = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list orders")?;

        Ok(rows)
    }

    pub async fn get_with_items(
        &self,
        order_id: i32,
    ) -> Result<Option<(orders::Model, Vec<order_items::Model>)>> {
        let rows = orders::Entity::find_by_id(order_id)
            .find_with_related(order_items::Entity)
            .all(&self.conn)
            .await
            .context("Failed to query order with items")?;

        Ok(rows.into_iter().next())
    }
}
