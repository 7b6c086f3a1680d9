//! Read-only access to train and route reference data.

mod cache;
mod postgres;

use std::future::Future;

pub use cache::{CachedReferenceStore, RouteCacheConfig};
pub use postgres::{PgConfig, PgReferenceStore};

use crate::domain::{DomainError, Route, TrainInfo};

/// Errors from the reference store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data violates a domain invariant
    #[error("invalid reference data: {0}")]
    Domain(#[from] DomainError),

    /// The store could not be reached after retrying
    #[error("reference store unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },
}

/// Source of reference data for the scraper.
pub trait ReferenceStore {
    /// Trains to scrape this cycle.
    fn active_trains(&self) -> impl Future<Output = Result<Vec<TrainInfo>, StoreError>> + Send;

    /// Ordered route of one train. Unknown trains yield an empty route.
    fn train_route(
        &self,
        train_number: &str,
    ) -> impl Future<Output = Result<Route, StoreError>> + Send;
}
