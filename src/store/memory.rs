//! In-memory store holding bincode-encoded records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::elevator_logic::CarId;
use crate::error::{Error, Result};
use crate::snapshot::{serial, PersistedState};
use crate::store::StateStore;

/// Store kept in process memory. Can be switched offline to simulate an outage.
#[derive(Debug)]
pub struct MemoryStore {
    records: Mutex<HashMap<CarId, Vec<u8>>>,
    available: AtomicBool,
    saves: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty, reachable store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            saves: AtomicUsize::new(0),
        }
    }

    /// Turns the simulated outage off (`true`) or on (`false`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::StoreUnavailable("memory store is offline".to_string()))
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self, car_id: CarId) -> Result<PersistedState> {
        self.check_available()?;
        let records = self
            .records
            .lock()
            .map_err(|_| Error::StoreUnavailable("memory store lock poisoned".to_string()))?;
        let bytes = records.get(&car_id).ok_or(Error::NotFound(car_id))?;
        serial::deserialize_state(bytes)
            .ok_or_else(|| Error::StoreUnavailable(format!("corrupt record for car {}", car_id)))
    }

    fn save(&self, car_id: CarId, state: &PersistedState) -> Result<()> {
        self.check_available()?;
        let bytes = serial::serialize_state(state)
            .ok_or_else(|| Error::StoreUnavailable(format!("could not encode record for car {}", car_id)))?;
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::StoreUnavailable("memory store lock poisoned".to_string()))?;
        records.insert(car_id, bytes);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
