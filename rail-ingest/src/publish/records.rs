//! Outbound record shapes.

use serde::{Deserialize, Serialize};

/// Current position of a train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainPosition {
    pub train_number: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated, not measured.
    pub speed_kmph: u32,
    pub delay_minutes: u32,
    pub current_station: String,
    /// Empty when the train is at its last stop or off-route.
    pub next_station: String,
    /// RFC 3339.
    pub eta_next: String,
    /// RFC 3339.
    pub timestamp: String,
}

/// A train reported at a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformChange {
    pub station_code: String,
    pub platform_number: String,
    pub train_number: String,
    /// "arrived" or "departed".
    pub event_type: String,
    pub timestamp: String,
}

/// A train running late.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayEvent {
    pub train_number: String,
    pub station_code: String,
    /// Time of the event as the source reported it.
    pub scheduled_time: String,
    /// Wall-clock "HH:MM" (UTC) when the delay was observed.
    pub actual_time: String,
    pub delay_minutes: u32,
    pub cause: String,
    pub timestamp: String,
}
