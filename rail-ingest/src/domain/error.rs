//! Domain error types.
//!
//! These errors represent invariant violations in reference data. They are
//! distinct from transport and storage errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Two stops on one route share a stop number
    #[error("route {train} has duplicate stop number {stop_number}")]
    DuplicateStop { train: String, stop_number: i32 },

    /// Stop numbers must strictly increase along a route
    #[error("route {train}: stop {stop_number} follows stop {previous}")]
    StopOutOfOrder {
        train: String,
        previous: i32,
        stop_number: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::DuplicateStop {
            train: "12951".into(),
            stop_number: 3,
        };
        assert_eq!(err.to_string(), "route 12951 has duplicate stop number 3");

        let err = DomainError::StopOutOfOrder {
            train: "12951".into(),
            previous: 5,
            stop_number: 2,
        };
        assert_eq!(err.to_string(), "route 12951: stop 2 follows stop 5");
    }
}
