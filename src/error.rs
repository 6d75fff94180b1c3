//! Error taxonomy for the dispatch core.
//!
//! None of these are fatal to the process. Request errors are returned to the caller
//! synchronously, store errors are reported and the car keeps running from memory.

use thiserror::Error;

use crate::elevator_logic::{CarId, Floor};

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Floor outside the configured range. Rejected at ingestion, never enters a request set.
    #[error("floor {floor} is outside [{min}, {max}]")]
    InvalidFloor {
        /// Requested floor
        floor: Floor,
        /// Lowest valid floor
        min: Floor,
        /// Highest valid floor
        max: Floor,
    },

    /// External call without a usable direction (`up` or `down`).
    #[error("invalid call direction: {0}")]
    InvalidDirection(String),

    /// The car already has as many pending stops as it accepts.
    #[error("capacity exceeded: car accepts at most {limit} pending stops")]
    CapacityExceeded {
        /// Configured ceiling
        limit: usize,
    },

    /// The external store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// No stored record for this car.
    #[error("no stored state for car {0}")]
    NotFound(CarId),

    /// Unknown car id passed to a multi-car operation.
    #[error("unknown car {0}")]
    UnknownCar(CarId),

    /// Configuration rejected by [crate::config::ElevatorConfig::validate].
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
