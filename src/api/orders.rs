use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, OrderDto, OrderSummaryDto};
use crate::models::PaymentMethod;
use crate::services::OrderItemInput;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub dish_id: i32,
    pub quantity: i32,
}

/// POST /orders
/// Places an order. Prices are snapshotted per line; header and items
/// land in one transaction.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let items: Vec<OrderItemInput> = payload
        .items
        .iter()
        .map(|line| OrderItemInput {
            dish_id: line.dish_id,
            quantity: line.quantity,
        })
        .collect();

    let (order, lines) = state
        .orders()
        .create_order(user.id, &items, payload.payment_method)
        .await?;

    tracing::info!(
        order_id = order.id,
        user_id = user.id,
        total = %order.total,
        "Order placed"
    );

    Ok(Json(ApiResponse::success(OrderDto::from_parts(order, lines))))
}

/// GET /orders
/// The caller's orders, newest first. Admins see every order.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<OrderSummaryDto>>>, ApiError> {
    let rows = state.orders().list_orders(user.id, user.is_admin()).await?;
    let dtos = rows.into_iter().map(OrderSummaryDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /orders/{id}
/// One order with its line items. A foreign order reads as not found.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    validate_id("order", id)?;

    let (order, items) = state.orders().get_order(user.id, id, user.is_admin()).await?;

    Ok(Json(ApiResponse::success(OrderDto::from_parts(order, items))))
}
