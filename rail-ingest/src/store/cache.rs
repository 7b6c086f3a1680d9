//! Caching layer for route lookups.
//!
//! Routes change rarely, while the active train list is re-read every
//! cycle. Only routes are cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use super::{ReferenceStore, StoreError};
use crate::domain::{Route, TrainInfo};

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    /// TTL for cached routes.
    pub ttl: Duration,

    /// Maximum number of cached routes.
    pub max_capacity: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_capacity: 1000,
        }
    }
}

/// Reference store with cached routes.
///
/// Failed lookups are not cached and will be retried on the next call.
pub struct CachedReferenceStore<S> {
    inner: S,
    routes: MokaCache<String, Arc<Route>>,
}

impl<S> CachedReferenceStore<S> {
    pub fn new(inner: S, config: &RouteCacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }

    /// Access the underlying store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn invalidate_cache(&self) {
        self.routes.invalidate_all();
    }
}

impl<S> ReferenceStore for CachedReferenceStore<S>
where
    S: ReferenceStore + Send + Sync,
{
    async fn active_trains(&self) -> Result<Vec<TrainInfo>, StoreError> {
        self.inner.active_trains().await
    }

    async fn train_route(&self, train_number: &str) -> Result<Route, StoreError> {
        if let Some(cached) = self.routes.get(train_number).await {
            return Ok(Route::clone(&cached));
        }

        let route = self.inner.train_route(train_number).await?;
        debug!(train = train_number, stops = route.len(), "Caching route");
        self.routes
            .insert(train_number.to_string(), Arc::new(route.clone()))
            .await;

        Ok(route)
    }
}
