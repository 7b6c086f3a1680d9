//! Postgres-backed reference store.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::{info, warn};

use super::{ReferenceStore, StoreError};
use crate::domain::{Route, RouteStop, TrainInfo};

const ACTIVE_TRAINS_SQL: &str = "
    SELECT number, name, source_station, destination_station
    FROM trains
    LIMIT $1";

const TRAIN_ROUTE_SQL: &str = "
    SELECT tr.station_code, tr.stop_number, tr.arrival_time::text, tr.departure_time::text,
           tr.distance_from_source, tr.day_number, tr.platform,
           COALESCE(s.latitude, 0)::float8, COALESCE(s.longitude, 0)::float8
    FROM train_routes tr
    JOIN stations s ON s.code = tr.station_code
    WHERE tr.train_number = $1
    ORDER BY tr.stop_number ASC";

type TrainRow = (String, String, Option<String>, Option<String>);

type RouteRow = (
    String,
    i32,
    Option<String>,
    Option<String>,
    i32,
    i32,
    Option<String>,
    f64,
    f64,
);

/// Connection settings for the reference database.
#[derive(Debug, Clone)]
pub struct PgConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Upper bound on trains returned per cycle
    pub max_active_trains: i64,
    /// Connection attempts before giving up at startup
    pub connect_attempts: u32,
    /// Pause between connection attempts
    pub retry_delay: Duration,
    /// Time allowed for a single attempt
    pub connect_timeout: Duration,
}

impl PgConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            max_active_trains: 50,
            connect_attempts: 30,
            retry_delay: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Set the per-cycle train limit.
    pub fn with_max_active_trains(mut self, n: i64) -> Self {
        self.max_active_trains = n;
        self
    }

    /// Set the startup retry policy.
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.connect_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }
}

/// Reference store reading the `trains`, `train_routes` and `stations` tables.
#[derive(Debug, Clone)]
pub struct PgReferenceStore {
    pool: PgPool,
    max_active_trains: i64,
}

impl PgReferenceStore {
    /// Connect, retrying while the database comes up.
    ///
    /// Running out of attempts is the worker's only fatal error.
    pub async fn connect(config: &PgConfig) -> Result<Self, StoreError> {
        let options = config.connect_options();
        let mut last_error = String::new();

        for attempt in 1..=config.connect_attempts {
            match PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(config.connect_timeout)
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => {
                    info!(attempt, host = %config.host, "Connected to reference store");
                    return Ok(Self::from_pool(pool, config.max_active_trains));
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Waiting for reference store");
                    last_error = e.to_string();
                    if attempt < config.connect_attempts {
                        tokio::time::sleep(config.retry_delay).await;
                    }
                }
            }
        }

        Err(StoreError::Unavailable {
            attempts: config.connect_attempts,
            message: last_error,
        })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool, max_active_trains: i64) -> Self {
        Self {
            pool,
            max_active_trains,
        }
    }
}

impl ReferenceStore for PgReferenceStore {
    async fn active_trains(&self) -> Result<Vec<TrainInfo>, StoreError> {
        let rows: Vec<TrainRow> = sqlx::query_as(ACTIVE_TRAINS_SQL)
            .bind(self.max_active_trains)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(train_from_row).collect())
    }

    async fn train_route(&self, train_number: &str) -> Result<Route, StoreError> {
        let rows: Vec<RouteRow> = sqlx::query_as(TRAIN_ROUTE_SQL)
            .bind(train_number)
            .fetch_all(&self.pool)
            .await?;

        route_from_rows(train_number, rows)
    }
}

fn train_from_row((number, name, source, destination): TrainRow) -> TrainInfo {
    TrainInfo::new(number, name)
        .with_endpoints(source.unwrap_or_default(), destination.unwrap_or_default())
}

fn route_from_rows(train_number: &str, rows: Vec<RouteRow>) -> Result<Route, StoreError> {
    let stops = rows
        .into_iter()
        .map(
            |(code, stop_number, arrival, departure, distance, day, platform, lat, lon)| RouteStop {
                station_code: code,
                stop_number,
                arrival_time: arrival,
                departure_time: departure,
                distance_km: distance,
                day_number: day,
                platform,
                latitude: lat,
                longitude: lon,
            },
        )
        .collect();

    Ok(Route::new(train_number, stops)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    fn row(code: &str, stop: i32) -> RouteRow {
        (
            code.to_string(),
            stop,
            Some("10:00:00".to_string()),
            None,
            stop * 100,
            1,
            None,
            19.0,
            72.8,
        )
    }

    #[test]
    fn config_defaults() {
        let config = PgConfig::new("localhost", 5432, "rail", "pw", "rail");
        assert_eq!(config.max_active_trains, 50);
        assert_eq!(config.connect_attempts, 30);
        assert_eq!(config.retry_delay, Duration::from_secs(2));

        let config = config
            .with_max_active_trains(10)
            .with_retry(3, Duration::from_millis(5));
        assert_eq!(config.max_active_trains, 10);
        assert_eq!(config.connect_attempts, 3);
    }

    #[test]
    fn null_endpoints_become_empty() {
        let train = train_from_row(("12951".into(), "Rajdhani".into(), None, Some("NDLS".into())));
        assert_eq!(train.source_station, "");
        assert_eq!(train.destination_station, "NDLS");
    }

    #[test]
    fn rows_to_route() {
        let route = route_from_rows("12951", vec![row("BCT", 1), row("ST", 2)]).unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.stops()[1].station_code, "ST");
        assert_eq!(route.stops()[1].distance_km, 200);
        assert_eq!(route.stops()[0].arrival_time.as_deref(), Some("10:00:00"));
        assert_eq!(route.next_station("BCT"), "ST");
    }

    #[test]
    fn duplicate_stops_rejected() {
        let err = route_from_rows("12951", vec![row("BCT", 1), row("ST", 1)]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::DuplicateStop { stop_number: 1, .. })
        ));
    }

    #[tokio::test]
    async fn connect_gives_up_after_attempts() {
        // Nothing listens on port 1.
        let config = PgConfig::new("127.0.0.1", 1, "rail", "pw", "rail")
            .with_retry(2, Duration::from_millis(10))
            .with_connect_timeout(Duration::from_millis(200));

        let err = PgReferenceStore::connect(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { attempts: 2, .. }));
    }
}
