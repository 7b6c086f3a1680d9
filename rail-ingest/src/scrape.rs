//! Per-train scrape orchestration across the two sources.
//!
//! The primary source is always tried first. Only a *fetch* failure (no
//! session, transport error, timeout, non-success status) sends a train to
//! the fallback source. A primary response that parses to zero events is
//! reported as "not running" and the fallback is not consulted.

use std::future::Future;

use chrono::{Local, NaiveDate};
use tracing::{error, warn};

use crate::domain::{RunningEvent, TrainInfo};
use crate::erail::{ErailClient, RouteStatusParser};
use crate::error::{FetchError, SessionError, SetupError};
use crate::ntes::{NtesClient, RunningStatusParser, Session};

/// Which source a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Primary,
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Primary => "ntes",
            Source::Fallback => "erail",
        }
    }
}

/// The session-authenticated source.
pub trait PrimarySource {
    /// Establish a session for one scrape cycle.
    fn acquire_session(&self) -> impl Future<Output = Result<Session, SessionError>> + Send;

    /// Fetch the raw running-status response for one train.
    fn fetch(
        &self,
        train_number: &str,
        session: &Session,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// The unauthenticated fallback source.
pub trait FallbackSource {
    /// Fetch the raw route-status response for one train.
    fn fetch(&self, train_number: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

impl PrimarySource for NtesClient {
    async fn acquire_session(&self) -> Result<Session, SessionError> {
        NtesClient::acquire_session(self).await
    }

    async fn fetch(&self, train_number: &str, session: &Session) -> Result<String, FetchError> {
        let today: NaiveDate = Local::now().date_naive();
        self.running_status(train_number, session, today).await
    }
}

impl FallbackSource for ErailClient {
    async fn fetch(&self, train_number: &str) -> Result<String, FetchError> {
        self.route_status(train_number).await
    }
}

/// Result of scraping one train.
#[derive(Debug)]
pub enum ScrapeOutcome {
    /// At least one event was extracted.
    Events {
        source: Source,
        events: Vec<RunningEvent>,
    },
    /// The source answered but reported nothing; the train is probably not
    /// running today.
    NotRunning { source: Source },
    /// Both sources failed to fetch. The train is skipped this cycle.
    Failed {
        primary: FetchError,
        fallback: FetchError,
    },
}

impl ScrapeOutcome {
    /// Events extracted, empty unless the outcome is `Events`.
    pub fn events(&self) -> &[RunningEvent] {
        match self {
            ScrapeOutcome::Events { events, .. } => events,
            _ => &[],
        }
    }

    /// Source that produced the result, if any source succeeded.
    pub fn source(&self) -> Option<Source> {
        match self {
            ScrapeOutcome::Events { source, .. } | ScrapeOutcome::NotRunning { source } => {
                Some(*source)
            }
            ScrapeOutcome::Failed { .. } => None,
        }
    }
}

/// Scrapes one train at a time from the primary source, falling back to
/// the secondary source on fetch failure.
#[derive(Debug, Clone)]
pub struct Scraper<P, F> {
    primary: P,
    fallback: F,
    primary_parser: RunningStatusParser,
    fallback_parser: RouteStatusParser,
}

impl<P: PrimarySource, F: FallbackSource> Scraper<P, F> {
    pub fn new(primary: P, fallback: F) -> Result<Self, SetupError> {
        Ok(Self {
            primary,
            fallback,
            primary_parser: RunningStatusParser::new()?,
            fallback_parser: RouteStatusParser::new()?,
        })
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    /// Establish the session shared by every train in a cycle.
    pub async fn acquire_session(&self) -> Result<Session, SessionError> {
        self.primary.acquire_session().await
    }

    /// Parse a raw body with the strategy belonging to `source`.
    pub fn parse(&self, source: Source, body: &str) -> Vec<RunningEvent> {
        match source {
            Source::Primary => self.primary_parser.parse(body),
            Source::Fallback => self.fallback_parser.parse(body),
        }
    }

    /// Scrape one train.
    ///
    /// `session` is `None` when this cycle's handshake failed; the primary
    /// fetch then fails immediately and the train goes to the fallback.
    pub async fn scrape(&self, train: &TrainInfo, session: Option<&Session>) -> ScrapeOutcome {
        let primary = match session {
            Some(session) => self.primary.fetch(&train.number, session).await,
            None => Err(FetchError::NoSession),
        };

        let (source, body) = match primary {
            Ok(body) => (Source::Primary, body),
            Err(primary_err) => {
                warn!(
                    train = %train.number,
                    error = %primary_err,
                    "Primary fetch failed, trying fallback"
                );
                match self.fallback.fetch(&train.number).await {
                    Ok(body) => (Source::Fallback, body),
                    Err(fallback_err) => {
                        error!(
                            train = %train.number,
                            error = %fallback_err,
                            "Fallback fetch also failed, skipping train"
                        );
                        return ScrapeOutcome::Failed {
                            primary: primary_err,
                            fallback: fallback_err,
                        };
                    }
                }
            }
        };

        let events = self.parse(source, &body);
        if events.is_empty() {
            return ScrapeOutcome::NotRunning { source };
        }
        ScrapeOutcome::Events { source, events }
    }
}
