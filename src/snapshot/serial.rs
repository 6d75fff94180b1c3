//! Serialization and Deserialization for [PersistedState]

use crate::snapshot::PersistedState;
use crate::print;


/// Serializes a `PersistedState` into a binary format.
///
/// Uses `bincode` for compact records.
/// If serialization fails, the function logs the error and returns `None`.
///
/// ## Parameters
/// - `state`: A reference to the record to be serialized.
///
/// ## Returns
/// - A `Vec<u8>` containing the serialized data.
pub fn serialize_state(state: &PersistedState) -> Option<Vec<u8>> {
    match bincode::serialize(state) {
        Ok(serialized_data) => Some(serialized_data),
        Err(e) => {
            print::err(format!("Serialization failed: {} (serial.rs, serialize_state())", e));
            None
        }
    }
}

/// Deserializes a `PersistedState` from a binary format.
///
/// If deserialization fails, the function logs the error and returns `None`.
pub fn deserialize_state(data: &[u8]) -> Option<PersistedState> {
    match bincode::deserialize(data) {
        Ok(state) => Some(state),
        Err(e) => {
            print::err(format!("Deserialization failed: {} (serial.rs, deserialize_state())", e));
            None
        }
    }
}

/// Serializes a `PersistedState` as pretty JSON, the format of the file store.
pub fn state_to_json(state: &PersistedState) -> Option<String> {
    match serde_json::to_string_pretty(state) {
        Ok(json) => Some(json),
        Err(e) => {
            print::err(format!("Serialization failed: {} (serial.rs, state_to_json())", e));
            None
        }
    }
}

/// Parses a `PersistedState` from JSON.
pub fn state_from_json(json: &str) -> Option<PersistedState> {
    match serde_json::from_str(json) {
        Ok(state) => Some(state),
        Err(e) => {
            print::err(format!("Deserialization failed: {} (serial.rs, state_from_json())", e));
            None
        }
    }
}
