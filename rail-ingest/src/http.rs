//! Shared HTTP client construction for the scraped sources.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

/// Browser user agent sent with every scrape request. Both sources reject
/// obviously non-browser clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default request timeout for scrape requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Build a client for scraping.
///
/// With a `jar`, every response's cookies are stored in it and replayed on
/// later requests made through this client.
pub fn scrape_client(
    timeout: Duration,
    jar: Option<Arc<Jar>>,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout);
    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }
    builder.build()
}
