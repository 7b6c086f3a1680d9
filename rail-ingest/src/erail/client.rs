//! eRail HTTP client.

use std::time::Duration;

use tracing::debug;

use crate::error::{FetchError, SetupError};
use crate::http::{DEFAULT_TIMEOUT, scrape_client};

/// Default base URL for eRail.
pub const DEFAULT_BASE_URL: &str = "https://erail.in";

/// Configuration for the eRail client.
#[derive(Debug, Clone)]
pub struct ErailConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ErailConfig {
    /// Create a config pointing at production eRail.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ErailConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// eRail client. Stateless: no cookies, no session.
#[derive(Debug, Clone)]
pub struct ErailClient {
    http: reqwest::Client,
    base_url: String,
}

impl ErailClient {
    pub fn new(config: ErailConfig) -> Result<Self, SetupError> {
        let http = scrape_client(Duration::from_secs(config.timeout_secs), None)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch the raw route-status blob for one train.
    pub async fn route_status(&self, train_number: &str) -> Result<String, FetchError> {
        let url = format!("{}/data.aspx", self.base_url);
        debug!(train = %train_number, %url, "Querying eRail");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("Action", "TRAINROUTE"),
                ("Password", "2012"),
                ("Data1", train_number),
                ("Data2", "0"),
                ("Cache", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::Router;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;

    use super::*;
    use crate::test_support::serve;

    #[test]
    fn config_defaults() {
        let config = ErailConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 15);

        let config = ErailConfig::new().with_base_url("http://x/").with_timeout(3);
        assert_eq!(config.base_url, "http://x");
        assert_eq!(config.timeout_secs, 3);
    }

    #[tokio::test]
    async fn sends_fixed_query() {
        let app = Router::new().route(
            "/data.aspx",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let expected = [
                    ("Action", "TRAINROUTE"),
                    ("Password", "2012"),
                    ("Data1", "12951"),
                    ("Data2", "0"),
                    ("Cache", "true"),
                ];
                if expected
                    .iter()
                    .all(|(k, v)| q.get(*k).map(String::as_str) == Some(*v))
                {
                    (StatusCode::OK, "BCT~Mumbai Central~Source~17:00~1").into_response()
                } else {
                    (StatusCode::BAD_REQUEST, "bad").into_response()
                }
            }),
        );
        let base = serve(app).await;

        let client = ErailClient::new(ErailConfig::new().with_base_url(&base)).unwrap();
        let body = client.route_status("12951").await.unwrap();
        assert_eq!(body, "BCT~Mumbai Central~Source~17:00~1");
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let app = Router::new().route(
            "/data.aspx",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = serve(app).await;

        let client = ErailClient::new(ErailConfig::new().with_base_url(&base)).unwrap();
        let err = client.route_status("12951").await.unwrap_err();
        assert_eq!(err.status(), Some(429));
    }
}
