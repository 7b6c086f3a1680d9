//! Turns a train's running events into outbound records.
//!
//! The last event is the train's current state. Speed and ETA are
//! heuristics tuned to what the scraped sources report; they live in
//! `estimate_speed` and `eta_next` so they can change without touching
//! parsing or publishing.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::domain::{EventKind, Route, RunningEvent, StationCoords, TrainInfo};
use crate::publish::{DelayEvent, PlatformChange, TrainPosition};

/// Scraped sources never say why a train is late.
pub const DELAY_CAUSE: &str = "Reported by NTES";

/// Fixed offset from now used as the ETA to the next station.
pub const ETA_OFFSET_MINS: i64 = 30;

/// Records derived from one train's events.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEvents {
    pub position: TrainPosition,
    /// One per event carrying a platform, in event order.
    pub platform_changes: Vec<PlatformChange>,
    /// Present only when the train is currently late.
    pub delay: Option<DelayEvent>,
}

/// Build outbound records for `train` from its events.
///
/// Returns `None` for an empty event list: the train is treated as not
/// running.
pub fn process(
    train: &TrainInfo,
    events: &[RunningEvent],
    route: &Route,
    coords: &StationCoords,
    now: DateTime<Utc>,
) -> Option<ProcessedEvents> {
    let last = events.last()?;
    let timestamp = rfc3339(now);
    let (latitude, longitude) = coords.get(&last.station_code);

    let position = TrainPosition {
        train_number: train.number.clone(),
        latitude,
        longitude,
        speed_kmph: estimate_speed(last),
        delay_minutes: last.delay_minutes,
        current_station: last.station_code.clone(),
        next_station: route.next_station(&last.station_code).to_string(),
        eta_next: rfc3339(eta_next(now)),
        timestamp: timestamp.clone(),
    };

    let platform_changes = events
        .iter()
        .filter_map(|ev| {
            Some(PlatformChange {
                station_code: ev.station_code.clone(),
                platform_number: ev.platform()?.to_string(),
                train_number: train.number.clone(),
                event_type: ev.kind.as_lowercase().to_string(),
                timestamp: timestamp.clone(),
            })
        })
        .collect();

    let delay = (last.delay_minutes > 0).then(|| DelayEvent {
        train_number: train.number.clone(),
        station_code: last.station_code.clone(),
        scheduled_time: last.time.clone(),
        actual_time: now.format("%H:%M").to_string(),
        delay_minutes: last.delay_minutes,
        cause: DELAY_CAUSE.to_string(),
        timestamp: timestamp.clone(),
    });

    Some(ProcessedEvents {
        position,
        platform_changes,
        delay,
    })
}

/// Estimated speed in km/h.
///
/// Stationary after an arrival. Otherwise a rough band: trains running
/// more than half an hour late are assumed to be crawling.
pub fn estimate_speed(event: &RunningEvent) -> u32 {
    match event.kind {
        EventKind::Arrived => 0,
        EventKind::Departed if event.delay_minutes > 30 => 40 + event.delay_minutes % 30,
        EventKind::Departed => 80 + event.delay_minutes % 40,
    }
}

/// ETA at the next station: a fixed offset from now.
pub fn eta_next(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(ETA_OFFSET_MINS)
}

/// RFC 3339, second precision, `Z` suffix.
pub fn rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::RouteStop;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 6, 8, 25, 13).unwrap()
    }

    fn train() -> TrainInfo {
        TrainInfo::new("12951", "Mumbai Rajdhani")
    }

    fn route() -> Route {
        Route::new(
            "12951",
            vec![
                RouteStop::new("BCT", 1, 18.97, 72.82),
                RouteStop::new("ST", 2, 21.21, 72.84),
                RouteStop::new("BRC", 3, 22.31, 73.18),
            ],
        )
        .unwrap()
    }

    fn departed(code: &str, delay: u32) -> RunningEvent {
        RunningEvent::new(EventKind::Departed, code, code, "08:05").with_delay(delay)
    }

    fn arrived(code: &str, delay: u32) -> RunningEvent {
        RunningEvent::new(EventKind::Arrived, code, code, "08:00").with_delay(delay)
    }

    fn run(events: &[RunningEvent]) -> Option<ProcessedEvents> {
        let route = route();
        let coords = StationCoords::from_route(&route);
        process(&train(), events, &route, &coords, now())
    }

    #[test]
    fn speed_when_arrived_is_zero() {
        assert_eq!(estimate_speed(&arrived("ST", 0)), 0);
        assert_eq!(estimate_speed(&arrived("ST", 95)), 0);
    }

    #[test]
    fn speed_when_running_late() {
        assert_eq!(estimate_speed(&departed("ST", 45)), 55);
        assert_eq!(estimate_speed(&departed("ST", 31)), 41);
        assert_eq!(estimate_speed(&departed("ST", 60)), 40);
    }

    #[test]
    fn speed_when_roughly_on_time() {
        assert_eq!(estimate_speed(&departed("ST", 10)), 90);
        assert_eq!(estimate_speed(&departed("ST", 0)), 80);
        // Exactly 30 is not "more than 30"
        assert_eq!(estimate_speed(&departed("ST", 30)), 110);
    }

    #[test]
    fn no_events_no_position() {
        assert_eq!(run(&[]), None);
    }

    #[test]
    fn position_from_last_event() {
        let out = run(&[departed("BCT", 0), arrived("ST", 0), departed("ST", 10)]).unwrap();
        let pos = out.position;

        assert_eq!(pos.train_number, "12951");
        assert_eq!(pos.current_station, "ST");
        assert_eq!(pos.next_station, "BRC");
        assert_eq!((pos.latitude, pos.longitude), (21.21, 72.84));
        assert_eq!(pos.speed_kmph, 90);
        assert_eq!(pos.delay_minutes, 10);
        assert_eq!(pos.timestamp, "2026-10-06T08:25:13Z");
        assert_eq!(pos.eta_next, "2026-10-06T08:55:13Z");
    }

    #[test]
    fn arrived_at_terminus() {
        let out = run(&[arrived("BRC", 0)]).unwrap();
        assert_eq!(out.position.speed_kmph, 0);
        assert_eq!(out.position.next_station, "");
        assert!(out.delay.is_none());
    }

    #[test]
    fn unknown_station_has_zero_coords() {
        let out = run(&[departed("XYZ", 0)]).unwrap();
        assert_eq!((out.position.latitude, out.position.longitude), (0.0, 0.0));
        assert_eq!(out.position.next_station, "");
    }

    #[test]
    fn platform_change_for_every_event_with_platform() {
        let events = [
            arrived("BCT", 0).with_platform("3"),
            departed("BCT", 0),
            arrived("ST", 0).with_platform(""),
            departed("ST", 4).with_platform("1"),
        ];
        let out = run(&events).unwrap();

        let changes: Vec<_> = out
            .platform_changes
            .iter()
            .map(|c| (c.station_code.as_str(), c.platform_number.as_str(), c.event_type.as_str()))
            .collect();
        assert_eq!(changes, vec![("BCT", "3", "arrived"), ("ST", "1", "departed")]);
        assert!(out.platform_changes.iter().all(|c| c.train_number == "12951"));
    }

    #[test]
    fn delay_event_only_when_late() {
        let out = run(&[departed("BCT", 20), departed("ST", 0)]).unwrap();
        assert!(out.delay.is_none());

        let out = run(&[departed("BCT", 0), departed("ST", 20)]).unwrap();
        let delay = out.delay.unwrap();
        assert_eq!(delay.station_code, "ST");
        assert_eq!(delay.delay_minutes, 20);
        assert_eq!(delay.scheduled_time, "08:05");
        assert_eq!(delay.actual_time, "08:25");
        assert_eq!(delay.cause, DELAY_CAUSE);
    }

    #[test]
    fn rfc3339_format() {
        assert_eq!(rfc3339(now()), "2026-10-06T08:25:13Z");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Speed always lands in one of the three bands
        #[test]
        fn speed_bands(delay in 0u32..10_000, departed in any::<bool>()) {
            let kind = if departed { EventKind::Departed } else { EventKind::Arrived };
            let speed = estimate_speed(&RunningEvent::new(kind, "ST", "Surat", "08:00").with_delay(delay));
            match (kind, delay > 30) {
                (EventKind::Arrived, _) => prop_assert_eq!(speed, 0),
                (EventKind::Departed, true) => prop_assert!((40..70).contains(&speed)),
                (EventKind::Departed, false) => prop_assert!((80..120).contains(&speed)),
            }
        }
    }
}
