//! Parseable log-ingestion sink.
//!
//! Each record is posted as a one-element JSON array to its log stream.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;

use super::EventSink;
use super::error::PublishError;
use super::records::{DelayEvent, PlatformChange, TrainPosition};

/// Default Parseable URL.
const DEFAULT_URL: &str = "http://localhost:8000";

pub const POSITION_STREAM: &str = "train-positions";
pub const PLATFORM_STREAM: &str = "platform-changes";
pub const DELAY_STREAM: &str = "delay-events";

/// Configuration for the Parseable sink.
#[derive(Debug, Clone)]
pub struct ParseableConfig {
    /// Base URL of the Parseable server
    pub url: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ParseableConfig {
    /// Create a config with the given credentials against the default URL.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: username.into(),
            password: password.into(),
            timeout_secs: 10,
        }
    }

    /// Set the server URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Value for the `Authorization` header.
    fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

/// Publishes records to Parseable log streams.
#[derive(Debug, Clone)]
pub struct ParseableSink {
    http: reqwest::Client,
    url: String,
}

impl ParseableSink {
    pub fn new(config: ParseableConfig) -> Result<Self, PublishError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&config.basic_auth())
            .map_err(|e| PublishError::InvalidCredentials(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    async fn ingest<T: Serialize + Sync>(
        &self,
        stream: &str,
        record: &T,
    ) -> Result<(), PublishError> {
        let url = format!("{}/api/v1/logstream/{}", self.url, stream);

        let response = self
            .http
            .post(&url)
            .header("X-P-Stream", stream)
            .json(&[record])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(PublishError::Status {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

impl EventSink for ParseableSink {
    async fn publish_position(&self, position: &TrainPosition) -> Result<(), PublishError> {
        self.ingest(POSITION_STREAM, position).await
    }

    async fn publish_platform_change(&self, change: &PlatformChange) -> Result<(), PublishError> {
        self.ingest(PLATFORM_STREAM, change).await
    }

    async fn publish_delay(&self, delay: &DelayEvent) -> Result<(), PublishError> {
        self.ingest(DELAY_STREAM, delay).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::Value;

    use super::*;
    use crate::test_support::serve;

    type Received = Arc<Mutex<Vec<(String, Value)>>>;

    /// Fake Parseable that records accepted batches and checks auth.
    async fn fake_parseable() -> (String, Received) {
        let received: Received = Arc::default();
        let store = received.clone();
        let app = Router::new().route(
            "/api/v1/logstream/:stream",
            post(
                move |Path(stream): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                    let store = store.clone();
                    async move {
                        let auth_ok = headers
                            .get("authorization")
                            .is_some_and(|v| v == "Basic YWRtaW46c2VjcmV0");
                        let stream_ok = headers
                            .get("x-p-stream")
                            .is_some_and(|v| v.to_str().ok() == Some(stream.as_str()));
                        if !auth_ok || !stream_ok {
                            return StatusCode::UNAUTHORIZED;
                        }
                        store.lock().unwrap().push((stream, body));
                        StatusCode::OK
                    }
                },
            ),
        );
        (serve(app).await, received)
    }

    fn change() -> PlatformChange {
        PlatformChange {
            station_code: "ST".into(),
            platform_number: "2".into(),
            train_number: "12951".into(),
            event_type: "arrived".into(),
            timestamp: "2026-10-06T08:05:00Z".into(),
        }
    }

    #[test]
    fn config_defaults() {
        let config = ParseableConfig::new("admin", "admin");
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.timeout_secs, 10);

        let config = config.with_url("http://parseable:8000/").with_timeout(2);
        assert_eq!(config.url, "http://parseable:8000");
        assert_eq!(config.timeout_secs, 2);
    }

    #[test]
    fn basic_auth_header() {
        let config = ParseableConfig::new("admin", "secret");
        assert_eq!(config.basic_auth(), "Basic YWRtaW46c2VjcmV0");
    }

    #[tokio::test]
    async fn posts_array_to_stream() {
        let (url, received) = fake_parseable().await;
        let config = ParseableConfig::new("admin", "secret").with_url(url);
        let sink = ParseableSink::new(config).unwrap();

        sink.publish_platform_change(&change()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let (stream, body) = &received[0];
        assert_eq!(stream, PLATFORM_STREAM);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["station_code"], "ST");
        assert_eq!(body[0]["event_type"], "arrived");
    }

    #[tokio::test]
    async fn rejected_credentials_are_status_error() {
        let (url, received) = fake_parseable().await;
        let config = ParseableConfig::new("admin", "wrong").with_url(url);
        let sink = ParseableSink::new(config).unwrap();

        let err = sink.publish_platform_change(&change()).await.unwrap_err();

        assert!(matches!(err, PublishError::Status { status: 401 }));
        assert!(received.lock().unwrap().is_empty());
    }
}
