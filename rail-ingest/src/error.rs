//! Error types for talking to the scraped sources.
//!
//! Parsing has no error type: both parsers degrade to a possibly-empty
//! event list instead of failing.

/// Failure to establish a session with the primary source.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport failure (connection refused, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bootstrap or token endpoint answered with a non-success status
    #[error("session endpoint returned status {status}")]
    Status { status: u16 },

    /// The token response did not contain a `name='..' value='..'` pair
    #[error("could not extract session token from response: {snippet}")]
    TokenMissing { snippet: String },
}

/// Failure to fetch a running-status response for one train.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No session token was available for an authenticated request
    #[error("no session token available")]
    NoSession,

    /// Transport failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-success status
    #[error("source returned status {status}")]
    Status { status: u16, body: String },
}

impl FetchError {
    /// HTTP status of the failed response, if the source answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            FetchError::NoSession => None,
        }
    }

    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Http(e) if e.is_timeout())
    }
}

/// Failure to construct a client or parser.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SessionError::Status { status: 503 };
        assert_eq!(err.to_string(), "session endpoint returned status 503");

        let err = SessionError::TokenMissing {
            snippet: "<html>".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not extract session token from response: <html>"
        );

        let err = FetchError::NoSession;
        assert_eq!(err.to_string(), "no session token available");

        let err = FetchError::Status {
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "source returned status 502");
    }

    #[test]
    fn fetch_error_status() {
        let err = FetchError::Status {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_timeout());
        assert_eq!(FetchError::NoSession.status(), None);
    }
}
