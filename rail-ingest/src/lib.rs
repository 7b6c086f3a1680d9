//! Railway live-status ingestion worker.
//!
//! Periodically scrapes running status for active trains from NTES,
//! falling back to eRail, and publishes positions, platform changes and
//! delays to a log store.

pub mod config;
pub mod domain;
pub mod erail;
pub mod error;
pub mod http;
pub mod ntes;
pub mod process;
pub mod publish;
pub mod scheduler;
pub mod scrape;
pub mod store;

#[cfg(test)]
mod test_support;
