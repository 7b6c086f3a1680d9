//! Live fan-out of published records over Valkey pub/sub.
//!
//! Subscribers follow one train (`train:live:{number}`) or one station
//! (`station:live:{code}`). A record is fanned out only after the inner
//! sink has accepted it, and a failed fan-out is logged, never returned.

use std::future::Future;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{DelayEvent, EventSink, PlatformChange, PublishError, TrainPosition};

/// Channel carrying every update for one train.
pub fn train_channel(train_number: &str) -> String {
    format!("train:live:{train_number}")
}

/// Channel carrying every update at one station.
pub fn station_channel(station_code: &str) -> String {
    format!("station:live:{station_code}")
}

/// Errors from the live channel.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    #[error("valkey error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Pub/sub transport for live messages.
pub trait LiveChannel {
    fn publish(
        &self,
        channel: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), LiveError>> + Send;
}

/// Address of the Valkey server.
#[derive(Debug, Clone)]
pub struct ValkeyConfig {
    pub host: String,
    pub port: u16,
    /// Applies to connecting and to each command
    pub timeout: Duration,
}

impl ValkeyConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

/// Valkey pub/sub channel.
///
/// Connects lazily. A failed publish drops the connection so the next one
/// reconnects.
pub struct ValkeyChannel {
    client: redis::Client,
    timeout: Duration,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl ValkeyChannel {
    /// Fails only on an unusable address; nothing is contacted yet.
    pub fn new(config: &ValkeyConfig) -> Result<Self, LiveError> {
        Ok(Self {
            client: redis::Client::open(config.url())?,
            timeout: config.timeout,
            conn: Mutex::new(None),
        })
    }

    /// Connect eagerly. An unreachable server is only logged.
    pub async fn warm_up(&self) {
        match self.connection().await {
            Ok(_) => info!("Connected to Valkey"),
            Err(e) => warn!(error = %e, "Could not connect to Valkey, live updates will retry"),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, LiveError> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let config = redis::AsyncConnectionConfig::new()
            .set_connection_timeout(self.timeout)
            .set_response_timeout(self.timeout);
        let conn = self
            .client
            .get_multiplexed_async_connection_with_config(&config)
            .await?;
        *slot = Some(conn.clone());
        Ok(conn)
    }
}

impl LiveChannel for ValkeyChannel {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), LiveError> {
        let mut conn = self.connection().await?;
        if let Err(e) = conn.publish::<_, _, ()>(channel, payload).await {
            *self.conn.lock().await = None;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Sink that forwards to `inner`, then fans accepted records out to live
/// subscribers.
pub struct LiveSink<S, L> {
    inner: S,
    live: L,
}

impl<S, L> LiveSink<S, L> {
    pub fn new(inner: S, live: L) -> Self {
        Self { inner, live }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn live(&self) -> &L {
        &self.live
    }
}

impl<S, L: LiveChannel> LiveSink<S, L> {
    async fn fan_out<T: Serialize + Sync>(
        &self,
        record: &T,
        channels: &[String],
    ) -> Result<(), PublishError> {
        let payload = serde_json::to_string(record)?;
        for channel in channels {
            if let Err(e) = self.live.publish(channel, &payload).await {
                warn!(channel = %channel, error = %e, "Live publish failed");
            }
        }
        Ok(())
    }
}

impl<S, L> EventSink for LiveSink<S, L>
where
    S: EventSink + Sync,
    L: LiveChannel + Sync,
{
    async fn publish_position(&self, position: &TrainPosition) -> Result<(), PublishError> {
        self.inner.publish_position(position).await?;

        let mut channels = vec![train_channel(&position.train_number)];
        if !position.current_station.is_empty() {
            channels.push(station_channel(&position.current_station));
        }
        self.fan_out(position, &channels).await
    }

    async fn publish_platform_change(&self, change: &PlatformChange) -> Result<(), PublishError> {
        self.inner.publish_platform_change(change).await?;
        self.fan_out(change, &[station_channel(&change.station_code)])
            .await
    }

    async fn publish_delay(&self, delay: &DelayEvent) -> Result<(), PublishError> {
        self.inner.publish_delay(delay).await?;
        self.fan_out(delay, &[train_channel(&delay.train_number)])
            .await
    }
}
