use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use airhouse_infra::store::postgres::migrate;
use airhouse_infra::{
    AccountStore, AppConfig, CategoryLedger, IdentityService, InMemoryAccountStore, InMemoryLedgerStore,
    InventoryLedger, LedgerStore, OrderLedger, PostgresAccountStore, PostgresLedgerStore,
};

const MAX_DB_CONNECTIONS: u32 = 10;

/// Application services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub identity: IdentityService,
    pub inventory: InventoryLedger,
    pub categories: CategoryLedger,
    pub orders: OrderLedger,
}

impl AppServices {
    pub fn new(config: &AppConfig, store: Arc<dyn LedgerStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            identity: IdentityService::new(accounts, &config.jwt_secret, config.token_ttl()),
            inventory: InventoryLedger::new(store.clone(), config.low_quantity),
            categories: CategoryLedger::new(store.clone()),
            orders: OrderLedger::new(store),
        }
    }

    pub fn low_quantity(&self) -> i64 {
        self.inventory.low_quantity()
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if config.use_persistent_stores {
        return build_persistent_services(config).await;
    }
    Ok(build_in_memory_services(config))
}

fn build_in_memory_services(config: &AppConfig) -> AppServices {
    tracing::info!("using in-memory stores");
    AppServices::new(
        config,
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(InMemoryAccountStore::new()),
    )
}

async fn build_persistent_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    migrate(&pool).await.context("failed to create schema")?;
    tracing::info!("using Postgres stores");

    Ok(AppServices::new(
        config,
        Arc::new(PostgresLedgerStore::new(pool.clone())),
        Arc::new(PostgresAccountStore::new(pool)),
    ))
}
