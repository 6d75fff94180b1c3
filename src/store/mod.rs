//! The external state store, seen only through [StateStore].
//!
//! One record ([PersistedState]) per car. The core never treats the store as a source of
//! truth: it writes through after every committed transition and reads only at start-up.
//!
//! Two implementations ship with the crate:
//! - [memory::MemoryStore]: bincode records in memory, with an outage switch
//! - [json_file::JsonFileStore]: one JSON file per car in a directory

pub mod memory;
pub mod json_file;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::elevator_logic::CarId;
use crate::error::Result;
use crate::snapshot::PersistedState;

/// Load/save collaborator for car records.
pub trait StateStore: Send + Sync {
    /// Reads the record of `car_id`.
    ///
    /// ## Returns
    /// - [crate::error::Error::NotFound] if the car has no record yet
    /// - [crate::error::Error::StoreUnavailable] if the store cannot be reached
    fn load(&self, car_id: CarId) -> Result<PersistedState>;

    /// Replaces the record of `car_id`.
    ///
    /// Fails with [crate::error::Error::StoreUnavailable] if the store cannot be reached.
    fn save(&self, car_id: CarId, state: &PersistedState) -> Result<()>;
}
