use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use storefront_catalog::Product;
use storefront_infra::{
    CatalogStore, InMemoryCatalogStore, InMemoryOrderLedger, OrderLedger, OrderService,
    PostgresCatalogStore, PostgresOrderLedger, load_seed_file, postgres, seed_catalog,
};

use crate::config::ApiConfig;

/// Order service over type-erased stores, so one router serves either backend.
pub type DynOrderService = OrderService<Arc<dyn CatalogStore>, Arc<dyn OrderLedger>>;

/// Shared application services (one instance per process).
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<DynOrderService>,
}

impl AppServices {
    pub fn new(catalog: Arc<dyn CatalogStore>, ledger: Arc<dyn OrderLedger>) -> Self {
        Self {
            orders: Arc::new(OrderService::new(catalog, ledger)),
        }
    }

    /// In-memory stores pre-filled with `products` (dev/test).
    pub fn in_memory(products: Vec<Product>) -> Self {
        Self::new(
            Arc::new(InMemoryCatalogStore::with_products(products)),
            Arc::new(InMemoryOrderLedger::new()),
        )
    }
}

/// Wire stores from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise. The catalog seed, if any, is applied to either.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let services = match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            postgres::migrate(&pool)
                .await
                .context("failed to apply schema")?;
            info!("using Postgres stores");
            AppServices::new(
                Arc::new(PostgresCatalogStore::new(pool.clone())),
                Arc::new(PostgresOrderLedger::new(pool)),
            )
        }
        None => {
            info!("DATABASE_URL not set; using in-memory stores");
            AppServices::in_memory(Vec::new())
        }
    };

    if let Some(path) = &config.catalog_seed {
        let products = load_seed_file(path)
            .with_context(|| format!("failed to load catalog seed {}", path.display()))?;
        seed_catalog(services.orders.catalog(), products)
            .await
            .context("failed to seed catalog")?;
    }

    Ok(services)
}
