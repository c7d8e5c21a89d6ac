use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use foody::api::AppState;
use foody::config::Config;
use foody::state::SharedState;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_API_KEY: &str = "foody_default_api_key_please_regenerate";

async fn spawn_app() -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps the in-memory database shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let shared = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    );
    let state = foody::api::create_app_state(shared, None);
    (foody::api::router(state.clone()).await, state)
}

fn request(method: &str, uri: &str, api_key: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }
    match body {
        Some(json) => builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_and_verify(app: &Router, state: &Arc<AppState>, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "password": "sup3rsecret", "name": "Test User" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user = state
        .store()
        .get_user_by_email(email)
        .await
        .unwrap()
        .unwrap();
    let code = state
        .store()
        .get_profile(user.id)
        .await
        .unwrap()
        .unwrap()
        .verification_code
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/verify-email",
            None,
            Some(json!({ "email": email, "code": code })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    user.api_key
}

/// Seeds one restaurant with two dishes and returns their ids.
async fn seed_catalog(state: &Arc<AppState>) -> (i32, i32) {
    let restaurant = state
        .store()
        .create_restaurant("Trattoria Bella", None, "12 Via Roma", 30, None)
        .await
        .unwrap();

    let pizza = state
        .store()
        .create_dish(
            restaurant.id,
            "Margherita",
            None,
            Decimal::from_str("12.99").unwrap(),
            Some("pizza"),
            None,
        )
        .await
        .unwrap();

    let salad = state
        .store()
        .create_dish(
            restaurant.id,
            "Caprese",
            None,
            Decimal::from_str("5.50").unwrap(),
            Some("salad"),
            None,
        )
        .await
        .unwrap();

    (pizza.id, salad.id)
}

#[tokio::test]
async fn test_order_total_uses_snapshot_prices() {
    let (app, state) = spawn_app().await;
    let (pizza_id, salad_id) = seed_catalog(&state).await;
    let api_key = register_and_verify(&app, &state, "hungry@example.com").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&api_key),
            Some(json!({
                "items": [
                    { "dish_id": pizza_id, "quantity": 2 },
                    { "dish_id": salad_id, "quantity": 1 }
                ]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    // 2 * 12.99 + 1 * 5.50
    assert_eq!(body["data"]["total"], "31.48");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["payment_method"], "card");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    // A later catalog price change must not touch the stored order.
    state
        .store()
        .update_dish(
            pizza_id,
            None,
            None,
            Some(Decimal::from_str("99.00").unwrap()),
            None,
            None,
        )
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/orders/{order_id}"),
            Some(&api_key),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], "31.48");
    let pizza_line = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["dish_id"].as_i64() == Some(i64::from(pizza_id)))
        .expect("pizza line should exist");
    assert_eq!(pizza_line["price"], "12.99");
}

#[tokio::test]
async fn test_invalid_orders_rejected() {
    let (app, state) = spawn_app().await;
    let (pizza_id, _) = seed_catalog(&state).await;
    let api_key = register_and_verify(&app, &state, "picky@example.com").await;

    // Empty item list.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&api_key),
            Some(json!({ "items": [] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Zero quantity.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&api_key),
            Some(json!({ "items": [{ "dish_id": pizza_id, "quantity": 0 }] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown dish.
    let response = app
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&api_key),
            Some(json!({ "items": [{ "dish_id": 9999, "quantity": 1 }] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nothing persisted from the failed attempts.
    let orders = state.store().list_all_orders().await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_orders_are_isolated_per_user() {
    let (app, state) = spawn_app().await;
    let (pizza_id, salad_id) = seed_catalog(&state).await;
    let key_a = register_and_verify(&app, &state, "alice@example.com").await;
    let key_b = register_and_verify(&app, &state, "bob@example.com").await;

    // Both users order the same dish; totals stay independent.
    let (response_a, response_b) = tokio::join!(
        app.clone().oneshot(request(
            "POST",
            "/api/orders",
            Some(&key_a),
            Some(json!({ "items": [{ "dish_id": pizza_id, "quantity": 1 }] })),
        )),
        app.clone().oneshot(request(
            "POST",
            "/api/orders",
            Some(&key_b),
            Some(json!({
                "items": [
                    { "dish_id": pizza_id, "quantity": 2 },
                    { "dish_id": salad_id, "quantity": 2 }
                ],
                "payment_method": "cash"
            })),
        )),
    );

    let body_a = body_json(response_a.unwrap()).await;
    let body_b = body_json(response_b.unwrap()).await;
    assert_eq!(body_a["data"]["total"], "12.99");
    assert_eq!(body_b["data"]["total"], "36.98");
    assert_eq!(body_b["data"]["payment_method"], "cash");

    let order_a_id = body_a["data"]["id"].as_i64().unwrap();

    // Listings only show the caller's own orders.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/orders", Some(&key_a), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["total"], "12.99");

    // A foreign order reads as missing.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/orders/{order_a_id}"),
            Some(&key_b),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Admins can inspect any order and see every order listed.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/orders/{order_a_id}"),
            Some(ADMIN_API_KEY),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/orders", Some(ADMIN_API_KEY), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_orders_listed_newest_first() {
    let (app, state) = spawn_app().await;
    let (pizza_id, salad_id) = seed_catalog(&state).await;
    let api_key = register_and_verify(&app, &state, "serial@example.com").await;

    for dish_id in [pizza_id, salad_id] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/orders",
                Some(&api_key),
                Some(json!({ "items": [{ "dish_id": dish_id, "quantity": 1 }] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // Distinct created_at values keep the ordering observable.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let response = app
        .oneshot(request("GET", "/api/orders", Some(&api_key), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["total"], "5.50");
    assert_eq!(rows[1]["total"], "12.99");
}
