//! Parser for NTES running-status responses.
//!
//! The markup is not a contract, so extraction is line-by-line and
//! best-effort: lines that don't look like an event are skipped and the
//! parser never fails.

use regex::{Captures, Regex};
use tracing::debug;

use crate::domain::{EventKind, RunningEvent};

// Character classes are ASCII-only: a `\d` that accepted Devanagari digits
// would let them through into outbound times.
const DEPARTED_PATTERN: &str = r"Departed(?-u:\s)+from(?-u:\s)+(.+?)(?-u:\s)*\(((?-u:\w)+)\)(?-u:\s)+at(?-u:\s)+([0-9]{2}:[0-9]{2})(?-u:\s)+[0-9]{2}-(?-u:\w){3}(?:(?-u:\s)+Delay:(?-u:\s)*([0-9]{2}):([0-9]{2}))?";
const ARRIVED_PATTERN: &str = r"Arrived(?-u:\s)+at(?-u:\s)+(.+?)(?-u:\s)*\(((?-u:\w)+)\)(?-u:\s)+at(?-u:\s)+([0-9]{2}:[0-9]{2})(?-u:\s)+[0-9]{2}-(?-u:\w){3}(?:(?-u:\s)+Delay:(?-u:\s)*([0-9]{2}):([0-9]{2}))?";
const PLATFORM_PATTERN: &str = r"(?:PF|Platform)(?-u:\s)*#?(?-u:\s)*([0-9]+)";

/// Extracts running events from an NTES response body.
#[derive(Debug, Clone)]
pub struct RunningStatusParser {
    departed: Regex,
    arrived: Regex,
    platform: Regex,
}

impl RunningStatusParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            departed: Regex::new(DEPARTED_PATTERN)?,
            arrived: Regex::new(ARRIVED_PATTERN)?,
            platform: Regex::new(PLATFORM_PATTERN)?,
        })
    }

    /// Parse a response into events, in line order.
    ///
    /// Each line is tried against both the departure and the arrival
    /// pattern; a line matching both yields the departure first.
    pub fn parse(&self, body: &str) -> Vec<RunningEvent> {
        let mut events = Vec::new();

        for line in body.lines().map(str::trim) {
            if let Some(caps) = self.departed.captures(line) {
                events.push(self.event(EventKind::Departed, &caps, line));
            }
            if let Some(caps) = self.arrived.captures(line) {
                events.push(self.event(EventKind::Arrived, &caps, line));
            }
        }

        debug!(events = events.len(), "Parsed NTES response");
        events
    }

    fn event(&self, kind: EventKind, caps: &Captures<'_>, line: &str) -> RunningEvent {
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

        let mut event = RunningEvent::new(kind, group(2), group(1).trim(), group(3))
            .with_delay(delay_minutes(group(4), group(5)));

        if let Some(pf) = self.platform.captures(line).and_then(|c| c.get(1)) {
            event.platform = Some(pf.as_str().to_string());
        }

        event
    }
}

/// "HH", "MM" → total minutes. Missing or malformed groups mean on time.
fn delay_minutes(hours: &str, minutes: &str) -> u32 {
    match (hours.parse::<u32>(), minutes.parse::<u32>()) {
        (Ok(h), Ok(m)) => h * 60 + m,
        _ => 0,
    }
}
