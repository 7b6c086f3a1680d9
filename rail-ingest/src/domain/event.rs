//! Running events reported by the scraped sources.

use std::fmt;

/// Whether a train was seen arriving at or departing from a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Arrived,
    Departed,
}

impl EventKind {
    /// The label used by the sources ("Arrived" / "Departed").
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Arrived => "Arrived",
            EventKind::Departed => "Departed",
        }
    }

    /// Lowercase label used in outbound platform records.
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            EventKind::Arrived => "arrived",
            EventKind::Departed => "departed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One arrival or departure observation, as reported by a source.
///
/// A scrape yields these in chronological order; the last one describes
/// where the train is now. They live for a single scrape cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningEvent {
    pub kind: EventKind,
    pub station_code: String,
    pub station_name: String,
    /// Time of day as reported ("HH:MM" from the primary source; free-form
    /// from the fallback source).
    pub time: String,
    /// Delay in minutes, 0 when on time or unknown.
    pub delay_minutes: u32,
    pub platform: Option<String>,
}

impl RunningEvent {
    /// Create an on-time event with no platform.
    pub fn new(
        kind: EventKind,
        station_code: impl Into<String>,
        station_name: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            station_code: station_code.into(),
            station_name: station_name.into(),
            time: time.into(),
            delay_minutes: 0,
            platform: None,
        }
    }

    /// Set the delay in minutes.
    pub fn with_delay(mut self, minutes: u32) -> Self {
        self.delay_minutes = minutes;
        self
    }

    /// Set the platform label.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// The platform label, if present and non-empty.
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref().filter(|p| !p.is_empty())
    }
}
