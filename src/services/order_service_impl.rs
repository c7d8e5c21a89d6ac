//! `SeaORM` implementation of the `OrderService` trait.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::db::{NewOrderLine, Store};
use crate::entities::{order_items, orders};
use crate::models::PaymentMethod;
use crate::services::order_service::{OrderError, OrderItemInput, OrderService};

pub struct SeaOrmOrderService {
    store: Store,
}

impl SeaOrmOrderService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderService for SeaOrmOrderService {
    async fn create_order(
        &self,
        user_id: i32,
        items: &[OrderItemInput],
        payment_method: PaymentMethod,
    ) -> Result<(orders::Model, Vec<order_items::Model>), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if items.iter().any(|item| item.quantity <= 0) {
            return Err(OrderError::InvalidQuantity);
        }

        let mut lines = Vec::with_capacity(items.len());
        let mut total = Decimal::ZERO;

        for item in items {
            let dish = self
                .store
                .get_dish(item.dish_id)
                .await?
                .ok_or(OrderError::DishNotFound(item.dish_id))?;

            total += dish.price * Decimal::from(item.quantity);
            lines.push(NewOrderLine {
                dish_id: dish.id,
                quantity: item.quantity,
                price: dish.price,
            });
        }

        let order = self
            .store
            .create_order_with_items(user_id, payment_method, total, &lines)
            .await?;

        self.store
            .get_order_with_items(order.id)
            .await?
            .ok_or_else(|| OrderError::Internal("Order vanished after creation".to_string()))
    }

    async fn list_orders(
        &self,
        user_id: i32,
        include_all: bool,
    ) -> Result<Vec<orders::Model>, OrderError> {
        let rows = if include_all {
            self.store.list_all_orders().await?
        } else {
            self.store.list_orders_for_user(user_id).await?
        };

        Ok(rows)
    }

    async fn get_order(
        &self,
        user_id: i32,
        order_id: i32,
        is_admin: bool,
    ) -> Result<(orders::Model, Vec<order_items::Model>), OrderError> {
        let (order, items) = self
            .store
            .get_order_with_items(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if !is_admin && order.user_id != user_id {
            return Err(OrderError::OrderNotFound);
        }

        Ok((order, items))
    }
}
