use anyhow::Result;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{cards, dishes, order_items, orders, profiles, restaurants};
use crate::models::{PaymentMethod, Role};

pub mod migrator;
pub mod repositories;

pub use repositories::card::CardFields;
pub use repositories::order::NewOrderLine;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn restaurant_repo(&self) -> repositories::restaurant::RestaurantRepository {
        repositories::restaurant::RestaurantRepository::new(self.conn.clone())
    }

    fn dish_repo(&self) -> repositories::restaurant::DishRepository {
        repositories::restaurant::DishRepository::new(self.conn.clone())
    }

    fn order_repo(&self) -> repositories::order::OrderRepository {
        repositories::order::OrderRepository::new(self.conn.clone())
    }

    fn card_repo(&self) -> repositories::card::CardRepository {
        repositories::card::CardRepository::new(self.conn.clone())
    }

    // ---- users ----

    pub async fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        self.user_repo().create(email, name, password_hash).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_password(
        &self,
        user_id: i32,
        new_password: &str,
        config: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, config)
            .await
    }

    pub async fn update_user_identity(
        &self,
        user_id: i32,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User> {
        self.user_repo().update_identity(user_id, name, email).await
    }

    pub async fn set_user_active(&self, user_id: i32, active: bool) -> Result<bool> {
        self.user_repo().set_active(user_id, active).await
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        self.user_repo().delete(user_id).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn list_users_with_profiles(&self) -> Result<Vec<(User, Option<profiles::Model>)>> {
        self.user_repo().list_with_profiles().await
    }

    // ---- profiles ----

    pub async fn create_profile(&self, user_id: i32, role: Role) -> Result<profiles::Model> {
        self.profile_repo().create(user_id, role).await
    }

    pub async fn get_profile(&self, user_id: i32) -> Result<Option<profiles::Model>> {
        self.profile_repo().get_by_user_id(user_id).await
    }

    pub async fn set_verification_code(
        &self,
        user_id: i32,
        code: &str,
        expiry: &str,
    ) -> Result<()> {
        self.profile_repo()
            .set_verification_code(user_id, code, expiry)
            .await
    }

    pub async fn mark_profile_verified(&self, user_id: i32) -> Result<()> {
        self.profile_repo().mark_verified(user_id).await
    }

    pub async fn update_profile_contact(
        &self,
        user_id: i32,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<profiles::Model> {
        self.profile_repo()
            .update_contact(user_id, phone, address)
            .await
    }

    // ---- catalog ----

    pub async fn list_restaurants(&self) -> Result<Vec<restaurants::Model>> {
        self.restaurant_repo().list().await
    }

    pub async fn get_restaurant(&self, id: i32) -> Result<Option<restaurants::Model>> {
        self.restaurant_repo().get(id).await
    }

    pub async fn create_restaurant(
        &self,
        name: &str,
        description: Option<&str>,
        address: &str,
        delivery_time_minutes: i32,
        image_url: Option<&str>,
    ) -> Result<restaurants::Model> {
        self.restaurant_repo()
            .create(name, description, address, delivery_time_minutes, image_url)
            .await
    }

    pub async fn update_restaurant(
        &self,
        id: i32,
        name: Option<&str>,
        description: Option<&str>,
        address: Option<&str>,
        delivery_time_minutes: Option<i32>,
        image_url: Option<&str>,
    ) -> Result<Option<restaurants::Model>> {
        self.restaurant_repo()
            .update(
                id,
                name,
                description,
                address,
                delivery_time_minutes,
                image_url,
            )
            .await
    }

    pub async fn delete_restaurant(&self, id: i32) -> Result<bool> {
        self.restaurant_repo().delete(id).await
    }

    pub async fn list_dishes(&self) -> Result<Vec<dishes::Model>> {
        self.dish_repo().list().await
    }

    pub async fn list_dishes_for_restaurant(&self, restaurant_id: i32) -> Result<Vec<dishes::Model>> {
        self.dish_repo().list_for_restaurant(restaurant_id).await
    }

    pub async fn get_dish(&self, id: i32) -> Result<Option<dishes::Model>> {
        self.dish_repo().get(id).await
    }

    pub async fn create_dish(
        &self,
        restaurant_id: i32,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        category: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<dishes::Model> {
        self.dish_repo()
            .create(restaurant_id, name, description, price, category, image_url)
            .await
    }

    pub async fn update_dish(
        &self,
        id: i32,
        name: Option<&str>,
        description: Option<&str>,
        price: Option<Decimal>,
        category: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<dishes::Model>> {
        self.dish_repo()
            .update(id, name, description, price, category, image_url)
            .await
    }

    pub async fn delete_dish(&self, id: i32) -> Result<bool> {
        self.dish_repo().delete(id).await
    }

    // ---- orders ----

    pub async fn create_order_with_items(
        &self,
        user_id: i32,
        payment_method: PaymentMethod,
        total: Decimal,
        lines: &[NewOrderLine],
    ) -> Result<orders::Model> {
        self.order_repo()
            .create_with_items(user_id, payment_method, total, lines)
            .await
    }

    pub async fn list_orders_for_user(&self, user_id: i32) -> Result<Vec<orders::Model>> {
        self.order_repo().list_for_user(user_id).await
    }

    pub async fn list_all_orders(&self) -> Result<Vec<orders::Model>> {
        self.order_repo().list_all().await
    }

    pub async fn get_order_with_items(
        &self,
        order_id: i32,
    ) -> Result<Option<(orders::Model, Vec<order_items::Model>)>> {
        self.order_repo().get_with_items(order_id).await
    }

    // ---- cards ----

    pub async fn create_card(&self, user_id: i32, fields: CardFields) -> Result<cards::Model> {
        self.card_repo().create(user_id, fields).await
    }

    pub async fn list_cards_for_user(&self, user_id: i32) -> Result<Vec<cards::Model>> {
        self.card_repo().list_for_user(user_id).await
    }

    pub async fn get_card_for_user(
        &self,
        user_id: i32,
        card_id: i32,
    ) -> Result<Option<cards::Model>> {
        self.card_repo().get_for_user(user_id, card_id).await
    }

    pub async fn update_card(
        &self,
        user_id: i32,
        card_id: i32,
        fields: CardFields,
    ) -> Result<Option<cards::Model>> {
        self.card_repo().update(user_id, card_id, fields).await
    }

    pub async fn delete_card(&self, user_id: i32, card_id: i32) -> Result<bool> {
        self.card_repo().delete(user_id, card_id).await
    }
}
