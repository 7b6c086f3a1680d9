//! Outbound records and the sink they are published to.
//!
//! The record shapes are fixed by the downstream consumers (log streams
//! and live subscribers); field names are serialized verbatim.

mod error;
mod live;
mod parseable;
mod records;

use std::future::Future;

pub use error::PublishError;
pub use live::{
    LiveChannel, LiveError, LiveSink, ValkeyChannel, ValkeyConfig, station_channel, train_channel,
};
pub use parseable::{ParseableConfig, ParseableSink};
pub use records::{DelayEvent, PlatformChange, TrainPosition};

/// Destination for outbound records.
///
/// Every call is independent and fire-and-forget from the caller's point
/// of view: failures are reported but nothing is retried.
pub trait EventSink {
    fn publish_position(
        &self,
        position: &TrainPosition,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;

    fn publish_platform_change(
        &self,
        change: &PlatformChange,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;

    fn publish_delay(
        &self,
        delay: &DelayEvent,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

#[cfg(test)]
pub(crate) mod fakes {
    //! Recording sink for processor and scheduler tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingSink {
        pub positions: Mutex<Vec<TrainPosition>>,
        pub platform_changes: Mutex<Vec<PlatformChange>>,
        pub delays: Mutex<Vec<DelayEvent>>,
        /// Fail every position publish (to check failures don't spread).
        pub fail_positions: bool,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn positions(&self) -> Vec<TrainPosition> {
            self.positions.lock().unwrap().clone()
        }

        pub fn platform_changes(&self) -> Vec<PlatformChange> {
            self.platform_changes.lock().unwrap().clone()
        }

        pub fn delays(&self) -> Vec<DelayEvent> {
            self.delays.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        async fn publish_position(&self, position: &TrainPosition) -> Result<(), PublishError> {
            if self.fail_positions {
                return Err(PublishError::Status { status: 500 });
            }
            self.positions.lock().unwrap().push(position.clone());
            Ok(())
        }

        async fn publish_platform_change(
            &self,
            change: &PlatformChange,
        ) -> Result<(), PublishError> {
            self.platform_changes.lock().unwrap().push(change.clone());
            Ok(())
        }

        async fn publish_delay(&self, delay: &DelayEvent) -> Result<(), PublishError> {
            self.delays.lock().unwrap().push(delay.clone());
            Ok(())
        }
    }
}
