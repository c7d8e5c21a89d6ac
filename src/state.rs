use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, LogMailer, Mailer, OrderService, SeaOrmAccountService, SeaOrmOrderService,
    SmtpMailer,
};

/// Everything built once at startup and shared across requests.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub mailer: Arc<dyn Mailer>,

    pub account_service: Arc<dyn AccountService>,

    pub order_service: Arc<dyn OrderService>,
}

impl SharedState {
    /// Wires the production mailer from config. Delivery disabled in config
    /// falls back to the logging mailer.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer: Arc<dyn Mailer> = if config.mail.enabled {
            Arc::new(SmtpMailer::new(&config.mail)?)
        } else {
            Arc::new(LogMailer)
        };

        Self::with_mailer(config, mailer).await
    }

    /// Same wiring with an injected mailer. Tests pass recording or failing
    /// fakes through here.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let config = Arc::new(RwLock::new(config));

        let account_service = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.clone(),
            mailer.clone(),
        )) as Arc<dyn AccountService>;

        let order_service =
            Arc::new(SeaOrmOrderService::new(store.clone())) as Arc<dyn OrderService>;

        Ok(Self {
            config,
            store,
            mailer,
            account_service,
            order_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
