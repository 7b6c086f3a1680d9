//! Parser for eRail route-status blobs.
//!
//! Rows are separated by a run of eight tildes on most deployments and by
//! `~^` on others; fields within a row by a single `~`. Positional fields:
//! station code, station name, arrival, departure, then free text that may
//! carry a delay remark.

use regex::Regex;
use tracing::debug;

use crate::domain::{EventKind, RunningEvent};

const ROW_DELIMITER: &str = "~~~~~~~~";
const ALT_ROW_DELIMITER: &str = "~^";
const FIELD_SEPARATOR: char = '~';

/// Rows with fewer fields are headers, footers or noise.
const MIN_FIELDS: usize = 5;

/// Station codes are 2 to 6 characters.
const STATION_CODE_LEN: std::ops::RangeInclusive<usize> = 2..=6;

const ARRIVAL_SENTINEL: &str = "Source";
const DEPARTURE_SENTINEL: &str = "Destination";

/// ASCII digits and whitespace only.
const DELAY_PATTERN: &str = r"([0-9]+)(?-u:\s)*(?:min|hr)";

/// Extracts running events from an eRail response body.
#[derive(Debug, Clone)]
pub struct RouteStatusParser {
    delay: Regex,
}

impl RouteStatusParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            delay: Regex::new(DELAY_PATTERN)?,
        })
    }

    /// Parse a blob into events, in row order.
    pub fn parse(&self, body: &str) -> Vec<RunningEvent> {
        let events: Vec<_> = split_rows(body)
            .into_iter()
            .filter_map(|row| self.parse_row(row))
            .collect();

        debug!(events = events.len(), "Parsed eRail response");
        events
    }

    fn parse_row(&self, row: &str) -> Option<RunningEvent> {
        let fields: Vec<&str> = row.trim().split(FIELD_SEPARATOR).map(str::trim).collect();
        if fields.len() < MIN_FIELDS {
            return None;
        }

        let code = fields[0];
        if !STATION_CODE_LEN.contains(&code.chars().count()) {
            debug!(code, "Dropping eRail row with implausible station code");
            return None;
        }

        let mut kind = None;
        let mut time = "";
        if !fields[2].is_empty() && fields[2] != ARRIVAL_SENTINEL {
            kind = Some(EventKind::Arrived);
            time = fields[2];
        }
        // A departure overrides an arrival in the same row.
        if !fields[3].is_empty() && fields[3] != DEPARTURE_SENTINEL {
            kind = Some(EventKind::Departed);
            time = fields[3];
        }

        let delay = fields[4..]
            .iter()
            .filter(|f| f.contains("late") || f.contains("delay"))
            .filter_map(|f| self.delay.captures(f))
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .last()
            .unwrap_or(0);

        Some(RunningEvent::new(kind?, code, fields[1], time).with_delay(delay))
    }
}

/// Split into rows, switching to the alternate delimiter when the primary
/// one leaves the blob in a single piece.
fn split_rows(body: &str) -> Vec<&str> {
    let rows: Vec<&str> = body.split(ROW_DELIMITER).collect();
    if rows.len() >= 2 {
        return rows;
    }
    debug!("Primary row delimiter not found, trying alternate");
    body.split(ALT_ROW_DELIMITER).collect()
}
