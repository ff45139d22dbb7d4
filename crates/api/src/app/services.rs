//! Service wiring: picks the storage backend and builds the catalog services on it.

use std::sync::Arc;

use catalog_infra::{
    CatalogCommands, CatalogService, InMemoryCatalogStore, PostgresCatalogStore, SharedStore,
    StoreError,
};

use crate::config::ApiConfig;

/// Services shared by every handler (behind `Extension<Arc<AppServices>>`).
#[derive(Clone)]
pub struct AppServices {
    /// Validating CRUD/filter surface.
    pub commands: CatalogCommands<SharedStore>,
    /// Promotion batch and sale-cost operations.
    pub catalog: CatalogService<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            commands: CatalogCommands::new(store.clone()),
            catalog: CatalogService::new(store),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCatalogStore::new()))
    }
}

/// Build services for `config`: Postgres when `DATABASE_URL` is set, in-memory otherwise.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory catalog store");
        return Ok(AppServices::in_memory());
    };

    let store = PostgresCatalogStore::connect(url, config.db_max_connections).await?;
    store.ensure_schema().await?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "connected to postgres catalog store"
    );
    Ok(AppServices::new(Arc::new(store)))
}
