//! NTES session handshake.
//!
//! A session is two requests on the same cookie jar: the landing page sets
//! the server-side session cookies, then the token endpoint issues the
//! anti-forgery key/value pair that must accompany every query. A token is
//! only good together with the cookies it was issued for.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderValue, REFERER};
use tracing::info;

use crate::error::SessionError;
use crate::http::scrape_client;

use super::client::NtesClient;

/// Pattern for the token markup: `name='KEY' value='VALUE'`.
pub(super) const TOKEN_PATTERN: &str = r"name='([^']+)'(?-u:\s)+value='([^']+)'";

/// Anti-forgery token for one scrape cycle, together with the cookies it
/// was issued against.
///
/// The token is worthless without those cookies, so they travel with it:
/// any `NtesClient` aimed at the same host can use the session.
#[derive(Clone)]
pub struct Session {
    key: String,
    value: String,
    jar: Arc<Jar>,
}

impl Session {
    /// Create a session from an already known token pair, with no cookies.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_jar(key, value, Arc::default())
    }

    pub(super) fn with_jar(
        key: impl Into<String>,
        value: impl Into<String>,
        jar: Arc<Jar>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            jar,
        }
    }

    /// Form field name the token must be sent under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `Cookie` header for a request to `url`, if any session cookie applies.
    pub(super) fn cookie_header(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("value", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Pull the token pair out of the token endpoint's response.
pub(super) fn extract_token(pattern: &Regex, body: &str) -> Option<(String, String)> {
    let caps = pattern.captures(body)?;
    let key = caps.get(1)?.as_str().to_string();
    let value = caps.get(2)?.as_str().to_string();
    Some((key, value))
}

impl NtesClient {
    /// Run the session handshake on a fresh cookie jar.
    ///
    /// Either both steps succeed and a usable session is returned, or the
    /// attempt fails as a whole.
    pub async fn acquire_session(&self) -> Result<Session, SessionError> {
        let jar = Arc::new(Jar::default());
        let http = scrape_client(self.timeout, Some(jar.clone()))?;
        let landing = self.landing_url();

        let response = http.get(&landing).send().await?;
        if !response.status().is_success() {
            return Err(SessionError::Status {
                status: response.status().as_u16(),
            });
        }

        let url = format!("{}/mntes/GetCSRFToken", self.base_url);
        let ts = Utc::now().timestamp_millis().to_string();
        let response = http
            .get(&url)
            .query(&[("t", ts.as_str())])
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, landing.as_str())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SessionError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let (key, value) =
            extract_token(&self.token_pattern, &body).ok_or_else(|| SessionError::TokenMissing {
                snippet: body.chars().take(200).collect(),
            })?;

        info!(key = %key, "NTES session established");
        Ok(Session::with_jar(key, value, jar))
    }
}
