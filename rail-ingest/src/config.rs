//! Environment-driven configuration.
//!
//! Every setting has a default, so an empty environment yields a worker
//! pointed at local services.

use std::time::Duration;

use serde::Deserialize;

use crate::erail::ErailConfig;
use crate::ntes::NtesConfig;
use crate::publish::{ParseableConfig, ValkeyConfig};
use crate::scheduler::SchedulerConfig;
use crate::store::{PgConfig, RouteCacheConfig};

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
}

/// Worker configuration, one field per environment variable.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_ntes_base_url")]
    pub ntes_base_url: String,
    #[serde(default = "default_erail_base_url")]
    pub erail_base_url: String,
    /// Seconds between cycle starts
    #[serde(default = "default_poll_interval")]
    pub ingestion_poll_interval: u64,
    /// Pause after each train, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_max_active_trains")]
    pub max_active_trains: i64,
    #[serde(default = "default_route_cache_ttl_secs")]
    pub route_cache_ttl_secs: u64,

    #[serde(default = "default_parseable_url")]
    pub parseable_url: String,
    #[serde(default = "default_parseable_credential")]
    pub parseable_user: String,
    #[serde(default = "default_parseable_credential")]
    pub parseable_password: String,

    #[serde(default = "default_valkey_host")]
    pub valkey_host: String,
    #[serde(default = "default_valkey_port")]
    pub valkey_port: u16,

    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,
    #[serde(default = "default_postgres_user")]
    pub postgres_user: String,
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,
    #[serde(default = "default_postgres_db")]
    pub postgres_db: String,
}

fn default_ntes_base_url() -> String {
    crate::ntes::DEFAULT_BASE_URL.to_string()
}

fn default_erail_base_url() -> String {
    crate::erail::DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_http_timeout_secs() -> u64 {
    15
}

fn default_max_active_trains() -> i64 {
    50
}

fn default_route_cache_ttl_secs() -> u64 {
    3600
}

fn default_parseable_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_parseable_credential() -> String {
    "admin".to_string()
}

fn default_valkey_host() -> String {
    "localhost".to_string()
}

fn default_valkey_port() -> u16 {
    6379
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_user() -> String {
    "rail".to_string()
}

fn default_postgres_password() -> String {
    "rail_secret_2024".to_string()
}

fn default_postgres_db() -> String {
    "rail".to_string()
}

impl IngestConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn load() -> Result<Self, ConfigError> {
        // Missing .env is fine.
        let _ = dotenv::dotenv();
        Ok(envy::from_env::<Self>()?)
    }

    /// Load from explicit key/value pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Self>(pairs)?)
    }

    pub fn ntes(&self) -> NtesConfig {
        NtesConfig::new()
            .with_base_url(&self.ntes_base_url)
            .with_timeout(self.http_timeout_secs)
    }

    pub fn erail(&self) -> ErailConfig {
        ErailConfig::new()
            .with_base_url(&self.erail_base_url)
            .with_timeout(self.http_timeout_secs)
    }

    pub fn parseable(&self) -> ParseableConfig {
        ParseableConfig::new(&self.parseable_user, &self.parseable_password)
            .with_url(&self.parseable_url)
    }

    pub fn valkey(&self) -> ValkeyConfig {
        ValkeyConfig::new(&self.valkey_host, self.valkey_port)
    }

    pub fn pg(&self) -> PgConfig {
        PgConfig::new(
            &self.postgres_host,
            self.postgres_port,
            &self.postgres_user,
            &self.postgres_password,
            &self.postgres_db,
        )
        .with_max_active_trains(self.max_active_trains)
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig::new()
            .with_poll_interval(Duration::from_secs(self.ingestion_poll_interval))
            .with_request_delay(Duration::from_millis(self.request_delay_ms))
    }

    pub fn route_cache(&self) -> RouteCacheConfig {
        RouteCacheConfig {
            ttl: Duration::from_secs(self.route_cache_ttl_secs),
            ..RouteCacheConfig::default()
        }
    }
}
