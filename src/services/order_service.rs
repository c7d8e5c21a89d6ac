//! Domain service for order placement and retrieval.

use thiserror::Error;

use crate::entities::{order_items, orders};
use crate::models::PaymentMethod;

/// Errors specific to order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("Dish {0} not found")]
    DishNotFound(i32),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// One requested line of a new order, before dish resolution.
#[derive(Debug, Clone, Copy)]
pub struct OrderItemInput {
    pub dish_id: i32,
    pub quantity: i32,
}

/// Domain service trait for orders.
#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Places an order: snapshots each dish's current price onto its line,
    /// totals them, and persists header plus items atomically.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyOrder`] or [`OrderError::InvalidQuantity`]
    /// for bad input and [`OrderError::DishNotFound`] for an unknown dish.
    async fn create_order(
        &self,
        user_id: i32,
        items: &[OrderItemInput],
        payment_method: PaymentMethod,
    ) -> Result<(orders::Model, Vec<order_items::Model>), OrderError>;

    /// Orders visible to the caller, newest first. Admins see everything
    /// when `include_all` is set.
    async fn list_orders(
        &self,
        user_id: i32,
        include_all: bool,
    ) -> Result<Vec<orders::Model>, OrderError>;

    /// One order with its line items. Non-admins only see their own;
    /// anything else reads as not found.
    async fn get_order(
        &self,
        user_id: i32,
        order_id: i32,
        is_admin: bool,
    ) -> Result<(orders::Model, Vec<order_items::Model>), OrderError>;
}
