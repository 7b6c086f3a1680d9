//! Poll scheduler.
//!
//! Runs one ingestion cycle immediately and then once per poll interval
//! until shutdown is signalled. A cycle walks the active train list
//! sequentially with a fixed pause between trains so the upstream sites
//! see a slow, steady request rate.

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::domain::{Route, StationCoords, TrainInfo};
use crate::ntes::Session;
use crate::process::{ProcessedEvents, process};
use crate::publish::EventSink;
use crate::scrape::{FallbackSource, PrimarySource, ScrapeOutcome, Scraper, Source};
use crate::store::ReferenceStore;

/// Timing for the poll loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between cycle starts
    pub poll_interval: Duration,
    /// Pause between consecutive trains within a cycle
    pub request_delay: Duration,
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            request_delay: Duration::from_millis(2000),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Active trains listed by the store
    pub trains: usize,
    /// Trains with events from the primary source
    pub primary: usize,
    /// Trains with events from the fallback source
    pub fallback: usize,
    pub not_running: usize,
    /// Trains both sources failed to fetch
    pub failed: usize,
    /// Shutdown was signalled before the cycle finished
    pub cancelled: bool,
}

/// Drives scrape cycles against a reference store and an event sink.
pub struct Scheduler<P, F, R, K> {
    scraper: Scraper<P, F>,
    store: R,
    sink: K,
    config: SchedulerConfig,
}

impl<P, F, R, K> Scheduler<P, F, R, K>
where
    P: PrimarySource,
    F: FallbackSource,
    R: ReferenceStore,
    K: EventSink,
{
    pub fn new(scraper: Scraper<P, F>, store: R, sink: K, config: SchedulerConfig) -> Self {
        Self {
            scraper,
            store,
            sink,
            config,
        }
    }

    /// Run cycles until `shutdown` turns true or its sender is dropped.
    ///
    /// The first cycle starts immediately. A cycle that overruns the poll
    /// interval delays the next one rather than triggering a burst.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            request_delay_ms = self.config.request_delay.as_millis() as u64,
            "Ingestion worker started"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }

            let report = self.run_cycle(&mut shutdown).await;
            if report.cancelled {
                break;
            }
        }

        info!("Ingestion worker stopped");
    }

    /// Run a single cycle over every active train.
    pub async fn run_cycle(&self, shutdown: &mut watch::Receiver<bool>) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();

        let trains = match self.store.active_trains().await {
            Ok(trains) => trains,
            Err(e) => {
                error!(error = %e, "Failed to load active trains, skipping cycle");
                return report;
            }
        };
        report.trains = trains.len();

        let session = match self.scraper.acquire_session().await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Session acquisition failed, using fallback for this cycle");
                None
            }
        };

        for (i, train) in trains.iter().enumerate() {
            if *shutdown.borrow() {
                report.cancelled = true;
                break;
            }

            self.ingest_train(train, session.as_ref(), &mut report).await;

            if i + 1 < trains.len() && self.pause(shutdown).await {
                report.cancelled = true;
                break;
            }
        }

        info!(
            trains = report.trains,
            primary = report.primary,
            fallback = report.fallback,
            not_running = report.not_running,
            failed = report.failed,
            cancelled = report.cancelled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cycle complete"
        );
        report
    }

    /// Wait out the inter-train delay. Returns true if shutdown interrupted it.
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.config.request_delay) => *shutdown.borrow(),
            _ = shutdown.changed() => true,
        }
    }

    async fn ingest_train(
        &self,
        train: &TrainInfo,
        session: Option<&Session>,
        report: &mut CycleReport,
    ) {
        let outcome = self.scraper.scrape(train, session).await;

        match &outcome {
            ScrapeOutcome::Failed { .. } => {
                report.failed += 1;
                return;
            }
            ScrapeOutcome::NotRunning { source } => {
                report.not_running += 1;
                warn!(
                    train = %train.number,
                    source = source.as_str(),
                    "No running events, train may not be running today"
                );
                return;
            }
            ScrapeOutcome::Events { source, .. } => match source {
                Source::Primary => report.primary += 1,
                Source::Fallback => report.fallback += 1,
            },
        }

        let route = match self.store.train_route(&train.number).await {
            Ok(route) => route,
            Err(e) => {
                warn!(
                    train = %train.number,
                    error = %e,
                    "Route lookup failed, publishing without route"
                );
                Route::empty(&train.number)
            }
        };
        let coords = StationCoords::from_route(&route);

        let Some(processed) = process(train, outcome.events(), &route, &coords, Utc::now()) else {
            return;
        };

        if let Some(last) = outcome.events().last() {
            info!(
                train = %train.number,
                name = %train.name,
                kind = %last.kind,
                station = %last.station_code,
                delay = last.delay_minutes,
                speed = processed.position.speed_kmph,
                "Train position"
            );
        }

        self.publish(train, &processed).await;
    }

    /// Publish every record. Failures are logged and do not stop the rest.
    async fn publish(&self, train: &TrainInfo, processed: &ProcessedEvents) {
        if let Err(e) = self.sink.publish_position(&processed.position).await {
            warn!(train = %train.number, error = %e, "Failed to publish position");
        }

        for change in &processed.platform_changes {
            if let Err(e) = self.sink.publish_platform_change(change).await {
                warn!(
                    train = %train.number,
                    station = %change.station_code,
                    error = %e,
                    "Failed to publish platform change"
                );
            }
        }

        if let Some(delay) = &processed.delay {
            if let Err(e) = self.sink.publish_delay(delay).await {
                warn!(train = %train.number, error = %e, "Failed to publish delay");
            }
        }
    }
}
