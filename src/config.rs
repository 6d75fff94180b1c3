//! # config.rs – Centralized Parameter Store
//!
//! This module holds all static program parameters used throughout the system,
//! and the runtime [`ElevatorConfig`] built from them.
//! Keeping configuration in one place makes tuning, experimentation, and testing easier.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use once_cell::sync::Lazy;

use crate::elevator_logic::Floor;
use crate::error::{Error, Result};

//
// ──────────────────────────────────────────────────────────────
//   1. BUILDING & CAR PARAMETERS
// ──────────────────────────────────────────────────────────────
//

/// Lowest floor served by default
pub const DEFAULT_MIN_FLOOR: Floor = 1;

/// Highest floor served by default
pub const DEFAULT_MAX_FLOOR: Floor = 20;

/// Floor a fresh car is parked at
pub const DEFAULT_HOME_FLOOR: Floor = 1;

/// Number of cars started by the binary
pub const DEFAULT_NUM_CARS: u8 = 1;

/// Max number of distinct pending stops (up + down) per car
pub const DEFAULT_CAPACITY: usize = 32;

//
// ──────────────────────────────────────────────────────────────
//   2. TIMING & INTERVALS
// ──────────────────────────────────────────────────────────────
//

/// Time the car needs to travel one floor
pub const TRAVEL_TIME_PER_FLOOR: Duration = Duration::from_millis(1000);

/// Time the doors stay open at a served floor
pub const DOOR_DWELL: Duration = Duration::from_millis(2000);

/// How often the mover checks its timers
pub const MOVER_POLL_PERIOD: Duration = Duration::from_millis(50);

/// Delay before the sync task retries a failed save
pub const STORE_RETRY_PERIOD: Duration = Duration::from_millis(500);

//
// ──────────────────────────────────────────────────────────────
//   3. CAR SELECTION
// ──────────────────────────────────────────────────────────────
//

/// Extra cost for a car that already has pending stops
pub const BUSY_PENALTY: u32 = 2;

/// Extra cost for a car travelling away from the call
pub const WRONG_DIRECTION_PENALTY: u32 = 10;

//
// ──────────────────────────────────────────────────────────────
//   4. STORAGE
// ──────────────────────────────────────────────────────────────
//

/// Directory the binary keeps its car records in
pub static DEFAULT_STORE_DIR: &str = "elevator_state";

//
// ──────────────────────────────────────────────────────────────
//   5. LOGGING CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Enable/disable printing of errors
pub static PRINT_ERR_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of warnings
pub static PRINT_WARN_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of success messages
pub static PRINT_OK_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of general info
pub static PRINT_INFO_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable miscellaneous prints (car table, custom colours)
pub static PRINT_ELSE_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));


/// Runtime configuration for the dispatch core and the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevatorConfig {
    /// Lowest valid floor.
    /// Default: [DEFAULT_MIN_FLOOR]
    pub min_floor: Floor,

    /// Highest valid floor.
    /// Default: [DEFAULT_MAX_FLOOR]
    pub max_floor: Floor,

    /// Floor a car starts at when no stored state exists.
    /// Default: [DEFAULT_HOME_FLOOR]
    pub home_floor: Floor,

    /// Number of cars in the building.
    /// Default: [DEFAULT_NUM_CARS]
    pub num_cars: u8,

    /// Ceiling on pending stops per car.
    /// Default: [DEFAULT_CAPACITY]
    pub capacity: usize,

    /// Travel time per floor.
    /// Default: [TRAVEL_TIME_PER_FLOOR]
    pub travel_time: Duration,

    /// Door dwell period.
    /// Default: [DOOR_DWELL]
    pub door_dwell: Duration,

    /// Directory for the JSON file store.
    /// Default: [DEFAULT_STORE_DIR]
    pub store_dir: PathBuf,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            min_floor: DEFAULT_MIN_FLOOR,
            max_floor: DEFAULT_MAX_FLOOR,
            home_floor: DEFAULT_HOME_FLOOR,
            num_cars: DEFAULT_NUM_CARS,
            capacity: DEFAULT_CAPACITY,
            travel_time: TRAVEL_TIME_PER_FLOOR,
            door_dwell: DOOR_DWELL,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

impl ElevatorConfig {
    /// Checks that the floor range, home floor, car count and capacity make sense.
    ///
    /// ## Returns
    /// - `Ok(())` if the configuration is usable
    /// - [Error::Config] describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.min_floor > self.max_floor {
            return Err(Error::Config(format!(
                "min_floor {} is above max_floor {}",
                self.min_floor, self.max_floor
            )));
        }
        if !self.contains(self.home_floor) {
            return Err(Error::Config(format!(
                "home floor {} is outside [{}, {}]",
                self.home_floor, self.min_floor, self.max_floor
            )));
        }
        if self.num_cars == 0 {
            return Err(Error::Config("at least one car is required".to_string()));
        }
        if self.capacity == 0 {
            return Err(Error::Config("capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Returns `true` if `floor` lies in `[min_floor, max_floor]`.
    pub fn contains(&self, floor: Floor) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    /// Fails with [Error::InvalidFloor] unless `floor` is in range.
    pub fn check_floor(&self, floor: Floor) -> Result<()> {
        if self.contains(floor) {
            Ok(())
        } else {
            Err(Error::InvalidFloor { floor, min: self.min_floor, max: self.max_floor })
        }
    }
}
