//! NTES HTTP client.
//!
//! Sessions are acquired through this client (see `session.rs`) and passed
//! back into every query; the cookies a query needs come from the session.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::header::{ACCEPT, CACHE_CONTROL, COOKIE, ORIGIN, REFERER};
use tracing::debug;

use crate::error::{FetchError, SetupError};
use crate::http::{DEFAULT_TIMEOUT, scrape_client};

use super::session::{Session, TOKEN_PATTERN};

/// Default base URL for NTES.
pub const DEFAULT_BASE_URL: &str = "https://enquiry.indianrail.gov.in";

/// Configuration for the NTES client.
#[derive(Debug, Clone)]
pub struct NtesConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NtesConfig {
    /// Create a config pointing at production NTES.
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

impl Default for NtesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// NTES client.
#[derive(Debug, Clone)]
pub struct NtesClient {
    pub(super) http: reqwest::Client,
    pub(super) base_url: String,
    pub(super) timeout: Duration,
    pub(super) token_pattern: Regex,
}

impl NtesClient {
    pub fn new(config: NtesConfig) -> Result<Self, SetupError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = scrape_client(timeout, None)?;
        let token_pattern = Regex::new(TOKEN_PATTERN)?;

        Ok(Self {
            http,
            base_url: config.base_url,
            timeout,
            token_pattern,
        })
    }

    /// Landing page; also the referrer for every AJAX call.
    pub(super) fn landing_url(&self) -> String {
        format!("{}/mntes/", self.base_url)
    }

    /// Query the running status of one train for `date`.
    ///
    /// Returns the raw response body. Any non-success status is a failure.
    pub async fn running_status(
        &self,
        train_number: &str,
        session: &Session,
        date: NaiveDate,
    ) -> Result<String, FetchError> {
        let ref_date = format_ref_date(date);
        let url = format!("{}/mntes/tr", self.base_url);
        debug!(train = %train_number, %url, %ref_date, "Querying NTES");

        // Form keys go out sorted, token key included.
        let form = BTreeMap::from([
            ("lan", "en"),
            ("jDate", ref_date.as_str()),
            ("trainNo", train_number),
            (session.key(), session.value()),
        ]);

        let mut request = self
            .http
            .post(&url)
            .query(&[
                ("opt", "TrainRunning"),
                ("subOpt", "FindRunningInstance"),
                ("refDate", ref_date.as_str()),
            ])
            .form(&form)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, self.landing_url())
            .header(ORIGIN, self.base_url.as_str())
            .header(ACCEPT, "*/*")
            .header(CACHE_CONTROL, "no-cache")
            .build()?;
        if let Some(cookies) = session.cookie_header(request.url()) {
            request.headers_mut().insert(COOKIE, cookies);
        }

        let response = self.http.execute(request).await?;

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

/// Format a date the way NTES expects it: "16-Oct-2026".
pub fn format_ref_date(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}
