use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{cards, dishes, order_items, orders, restaurants};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RestaurantDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub delivery_time_minutes: i32,
    pub image_url: Option<String>,
}

impl From<restaurants::Model> for RestaurantDto {
    fn from(model: restaurants::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            address: model.address,
            delivery_time_minutes: model.delivery_time_minutes,
            image_url: model.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DishDto {
    pub id: i32,
    pub restaurant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl From<dishes::Model> for DishDto {
    fn from(model: dishes::Model) -> Self {
        Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
        }
    }
}

/// Order header without its lines, used by listings.
#[derive(Debug, Serialize)]
pub struct OrderSummaryDto {
    pub id: i32,
    pub user_id: i32,
    pub status: String,
    pub payment_method: String,
    pub total: Decimal,
    pub created_at: String,
}

impl From<orders::Model> for OrderSummaryDto {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            status: model.status,
            payment_method: model.payment_method,
            total: model.total,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: i32,
    pub user_id: i32,
    pub status: String,
    pub payment_method: String,
    pub total: Decimal,
    pub created_at: String,
    pub items: Vec<OrderItemDto>,
}

impl OrderDto {
    #[must_use]
    pub fn from_parts(order: orders::Model, items: Vec<order_items::Model>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            payment_method: order.payment_method,
            total: order.total,
            created_at: order.created_at,
            items: items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub id: i32,
    pub dish_id: i32,
    pub quantity: i32,
    /// Snapshot price at order time, not the current catalog price.
    pub price: Decimal,
}

impl From<order_items::Model> for OrderItemDto {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            dish_id: model.dish_id,
            quantity: model.quantity,
            price: model.price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardDto {
    pub id: i32,
    pub card_number: String,
    pub holder_name: String,
    pub expiry: String,
    pub brand: Option<String>,
    pub created_at: String,
}

impl From<cards::Model> for CardDto {
    fn from(model: cards::Model) -> Self {
        Self {
            id: model.id,
            card_number: model.card_number,
            holder_name: model.holder_name,
            expiry: model.expiry,
            brand: model.brand,
            created_at: model.created_at,
        }
    }
}

/// Card fields as submitted by the client. Brand is never accepted here.
#[derive(Debug, Deserialize)]
pub struct CardPayload {
    pub card_number: String,
    pub holder_name: String,
    pub expiry: String,
    pub cvv: String,
}
