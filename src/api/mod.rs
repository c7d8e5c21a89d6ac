use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::constants::auth as auth_constants;
use crate::state::SharedState;

pub mod auth;
mod cards;
mod dishes;
mod error;
mod observability;
mod orders;
mod profile;
mod restaurants;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{AccountService, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.shared.account_service
    }

    #[must_use]
    pub fn orders(&self) -> &Arc<dyn OrderService> {
        &self.shared.order_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            auth_constants::SESSION_TTL_MINUTES,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/login", post(auth::login))
        .route("/health", get(system::get_health))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/change-password", post(auth::change_password))
        .route("/profile", get(profile::get_profile))
        .route("/profile", put(profile::update_profile))
        .route("/restaurants", get(restaurants::list_restaurants))
        .route("/restaurants", post(restaurants::create_restaurant))
        .route("/restaurants/{id}", get(restaurants::get_restaurant))
        .route("/restaurants/{id}", put(restaurants::update_restaurant))
        .route("/restaurants/{id}", delete(restaurants::delete_restaurant))
        .route(
            "/restaurants/{id}/dishes",
            get(restaurants::list_restaurant_dishes),
        )
        .route("/dishes", get(dishes::list_dishes))
        .route("/dishes", post(dishes::create_dish))
        .route("/dishes/{id}", get(dishes::get_dish))
        .route("/dishes/{id}", put(dishes::update_dish))
        .route("/dishes/{id}", delete(dishes::delete_dish))
        .route("/orders", get(orders::list_orders))
        .route("/orders", post(orders::create_order))
        .route("/orders/{id}", get(orders::get_order))
        .route("/cards", get(cards::list_cards))
        .route("/cards", post(cards::add_card))
        .route("/cards/{id}", get(cards::get_card))
        .route("/cards/{id}", put(cards::update_card))
        .route("/cards/{id}", delete(cards::delete_card))
        .route("/users", get(users::list_users))
        .route("/users/{id}/toggle-active", post(users::toggle_active))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
