//! Domain types for the ingestion worker.
//!
//! Reference data (trains, routes) comes from the reference store and is
//! read-only here. Running events are produced fresh by every scrape cycle
//! and never persisted.

mod error;
mod event;
mod route;
mod train;

pub use error::DomainError;
pub use event::{EventKind, RunningEvent};
pub use route::{Route, RouteStop, StationCoords};
pub use train::TrainInfo;
