//! Train reference data.

/// An active train as listed by the reference store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainInfo {
    /// Train number, e.g. "12951". Kept as a string: leading zeros matter.
    pub number: String,
    /// Display name, e.g. "Mumbai Rajdhani".
    pub name: String,
    /// Origin station code (empty when unknown).
    pub source_station: String,
    /// Terminus station code (empty when unknown).
    pub destination_station: String,
}

impl TrainInfo {
    /// Create a train with no origin/terminus information.
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            source_station: String::new(),
            destination_station: String::new(),
        }
    }

    /// Set origin and terminus station codes.
    pub fn with_endpoints(
        mut self,
        source_station: impl Into<String>,
        destination_station: impl Into<String>,
    ) -> Self {
        self.source_station = source_station.into();
        self.destination_station = destination_station.into();
        self
    }
}
