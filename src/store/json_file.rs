//! File store: one pretty-printed JSON record per car, `car_<id>.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::elevator_logic::CarId;
use crate::error::{Error, Result};
use crate::snapshot::{serial, PersistedState};
use crate::store::StateStore;

/// Store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (and creates if needed) the store directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::StoreUnavailable(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// Directory the records live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `car_id`.
    pub fn record_path(&self, car_id: CarId) -> PathBuf {
        self.dir.join(format!("car_{}.json", car_id))
    }
}

impl StateStore for JsonFileStore {
    fn load(&self, car_id: CarId) -> Result<PersistedState> {
        let path = self.record_path(car_id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::NotFound(car_id)),
            Err(e) => return Err(Error::StoreUnavailable(format!("cannot read {}: {}", path.display(), e))),
        };
        serial::state_from_json(&json)
            .ok_or_else(|| Error::StoreUnavailable(format!("corrupt record in {}", path.display())))
    }

    fn save(&self, car_id: CarId, state: &PersistedState) -> Result<()> {
        let path = self.record_path(car_id);
        let json = serial::state_to_json(state)
            .ok_or_else(|| Error::StoreUnavailable(format!("could not encode record for car {}", car_id)))?;

        // Replace atomically
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| Error::StoreUnavailable(format!("cannot write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::StoreUnavailable(format!("cannot replace {}: {}", path.display(), e)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ElevatorStatus;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("elevatordispatch_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn record_survives_reopening_the_store() {
        let dir = scratch_dir("reopen");
        let state = PersistedState { current_floor: 11, state: ElevatorStatus::GoingUp, up: vec![12, 15], down: vec![3], deferred: vec![] };

        JsonFileStore::new(&dir).unwrap().save(2, &state).unwrap();
        let reopened = JsonFileStore::new(&dir).unwrap();
        assert_eq!(reopened.load(2), Ok(state));
        assert!(reopened.record_path(2).ends_with("car_2.json"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = scratch_dir("missing");
        let store = JsonFileStore::new(&dir).unwrap();
        assert_eq!(store.load(0), Err(Error::NotFound(0)));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_is_reported_as_unavailable() {
        let dir = scratch_dir("corrupt");
        let store = JsonFileStore::new(&dir).unwrap();
        fs::write(store.record_path(0), "{ not json").unwrap();
        assert!(matches!(store.load(0), Err(Error::StoreUnavailable(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_uses_store_field_names() {
        let dir = scratch_dir("fields");
        let store = JsonFileStore::new(&dir).unwrap();
        let state = PersistedState { current_floor: 4, state: ElevatorStatus::Idle, up: vec![], down: vec![], deferred: vec![] };
        store.save(0, &state).unwrap();
        let raw = fs::read_to_string(store.record_path(0)).unwrap();
        assert!(raw.contains("currentFloor"));
        assert!(raw.contains("\"idle\""));
        let _ = fs::remove_dir_all(&dir);
    }
}
