use std::sync::Arc;

use fieldframe_core::entry::EntryStore;
use fieldframe_core::relation::RelationResolver;
use fieldframe_core::schema::SchemaRegistry;
use fieldframe_core::view::ViewStore;
use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor. Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pool: PgPool,
    config: AppConfig,
    registry: SchemaRegistry,
    entries: EntryStore,
    views: ViewStore,
    resolver: RelationResolver,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(InnerState {
                registry: SchemaRegistry::new(pool.clone()),
                entries: EntryStore::new(pool.clone()),
                views: ViewStore::new(pool.clone()),
                resolver: RelationResolver::new(pool.clone()),
                pool,
                config,
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.inner.registry
    }

    pub fn entries(&self) -> &EntryStore {
        &self.inner.entries
    }

    pub fn views(&self) -> &ViewStore {
        &self.inner.views
    }

    pub fn resolver(&self) -> &RelationResolver {
        &self.inner.resolver
    }
}
