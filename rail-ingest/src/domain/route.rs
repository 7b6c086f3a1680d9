//! Train routes and station coordinates.

use std::collections::HashMap;

use super::error::DomainError;

/// One scheduled stop on a train's route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStop {
    pub station_code: String,
    pub stop_number: i32,
    /// Scheduled arrival; `None` at the origin or on a data gap.
    pub arrival_time: Option<String>,
    /// Scheduled departure; `None` at the terminus or on a data gap.
    pub departure_time: Option<String>,
    /// Cumulative distance from the origin, in km.
    pub distance_km: i32,
    /// Day offset from the journey's start day (1-based).
    pub day_number: i32,
    pub platform: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl RouteStop {
    /// Create a stop with no schedule or platform information.
    pub fn new(
        station_code: impl Into<String>,
        stop_number: i32,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            station_code: station_code.into(),
            stop_number,
            arrival_time: None,
            departure_time: None,
            distance_km: 0,
            day_number: 1,
            platform: None,
            latitude,
            longitude,
        }
    }
}

/// A train's ordered stop sequence.
///
/// Stop numbers strictly increase along the route; `Route::new` rejects
/// anything else, so code holding a `Route` can rely on the ordering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    train_number: String,
    stops: Vec<RouteStop>,
}

impl Route {
    /// Build a route from stops already sorted by stop number.
    pub fn new(
        train_number: impl Into<String>,
        stops: Vec<RouteStop>,
    ) -> Result<Self, DomainError> {
        let train_number = train_number.into();

        for pair in stops.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.stop_number == prev.stop_number {
                return Err(DomainError::DuplicateStop {
                    train: train_number,
                    stop_number: next.stop_number,
                });
            }
            if next.stop_number < prev.stop_number {
                return Err(DomainError::StopOutOfOrder {
                    train: train_number,
                    previous: prev.stop_number,
                    stop_number: next.stop_number,
                });
            }
        }

        Ok(Self {
            train_number,
            stops,
        })
    }

    /// A route with no stops (unknown route).
    pub fn empty(train_number: impl Into<String>) -> Self {
        Self {
            train_number: train_number.into(),
            stops: Vec::new(),
        }
    }

    pub fn train_number(&self) -> &str {
        &self.train_number
    }

    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Code of the stop after `station_code`.
    ///
    /// Returns an empty string when the station is the last stop or is not
    /// on the route at all. On routes that visit a station twice the first
    /// visit with a successor wins.
    pub fn next_station(&self, station_code: &str) -> &str {
        self.stops
            .windows(2)
            .find(|pair| pair[0].station_code == station_code)
            .map(|pair| pair[1].station_code.as_str())
            .unwrap_or("")
    }
}

/// Station code → (latitude, longitude), built from a route.
#[derive(Debug, Clone, Default)]
pub struct StationCoords(HashMap<String, (f64, f64)>);

impl StationCoords {
    /// Collect coordinates for every stop on the route.
    pub fn from_route(route: &Route) -> Self {
        Self(
            route
                .stops()
                .iter()
                .map(|s| (s.station_code.clone(), (s.latitude, s.longitude)))
                .collect(),
        )
    }

    /// Coordinates for a station, or `(0.0, 0.0)` if it is not known.
    pub fn get(&self, station_code: &str) -> (f64, f64) {
        self.0.get(station_code).copied().unwrap_or((0.0, 0.0))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any strictly increasing numbering is accepted
        #[test]
        fn increasing_numbers_accepted(
            numbers in proptest::collection::btree_set(-50i32..500, 0..20)
        ) {
            let stops: Vec<_> = numbers
                .into_iter()
                .map(|n| RouteStop::new(format!("S{n}"), n, 0.0, 0.0))
                .collect();
            let count = stops.len();
            let route = Route::new("1", stops).unwrap();
            prop_assert_eq!(route.len(), count);
        }

        /// The next station of every stop but the last is its successor
        #[test]
        fn next_station_is_successor(len in 1usize..15) {
            let stops: Vec<_> = (0..len)
                .map(|i| RouteStop::new(format!("S{i}"), i as i32, 0.0, 0.0))
                .collect();
            let route = Route::new("1", stops).unwrap();
            for i in 0..len - 1 {
                let expected = format!("S{}", i + 1);
                prop_assert_eq!(route.next_station(&format!("S{i}")), expected.as_str());
            }
            let last = format!("S{}", len - 1);
            prop_assert_eq!(route.next_station(&last), "");
        }
    }
}
