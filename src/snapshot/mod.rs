//! Read side of a car: what the transport layer sees and what goes to the store.
//!
//! Internally a car keeps its travel direction ([Dirn]) and motion phase
//! ([ElevatorBehaviour]) apart. The store keeps one flattened [ElevatorStatus]
//! (`idle | going_up | going_down`); [PersistedState] is the adapter between the two.

pub mod serial;

use serde::{Serialize, Deserialize};

use crate::elevator_logic::{CarId, Floor};


#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Direction a car is taking calls in.
pub enum Dirn {
    Down = -1,
    Idle = 0,
    Up = 1,
}

impl Dirn {
    /// The opposite travel direction. `Idle` stays `Idle`.
    pub fn reverse(self) -> Dirn {
        match self {
            Dirn::Up => Dirn::Down,
            Dirn::Down => Dirn::Up,
            Dirn::Idle => Dirn::Idle,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Motion phase of a car: parked, between floors, or at a floor with the doors open.
pub enum ElevatorBehaviour {
    Stopped,
    Moving,
    DoorOpen,
}

/// Flattened state kept in the store.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevatorStatus {
    Idle,
    GoingUp,
    GoingDown,
}

impl From<Dirn> for ElevatorStatus {
    fn from(dirn: Dirn) -> Self {
        match dirn {
            Dirn::Up => ElevatorStatus::GoingUp,
            Dirn::Down => ElevatorStatus::GoingDown,
            Dirn::Idle => ElevatorStatus::Idle,
        }
    }
}

impl From<ElevatorStatus> for Dirn {
    fn from(status: ElevatorStatus) -> Self {
        match status {
            ElevatorStatus::GoingUp => Dirn::Up,
            ElevatorStatus::GoingDown => Dirn::Down,
            ElevatorStatus::Idle => Dirn::Idle,
        }
    }
}

impl ElevatorStatus {
    /// The string stored in the `state` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElevatorStatus::Idle => "idle",
            ElevatorStatus::GoingUp => "going_up",
            ElevatorStatus::GoingDown => "going_down",
        }
    }
}

/// Answer to `GetState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarState {
    /// Last floor the car reached
    pub current_floor: Floor,
    /// Travel direction
    pub dirn: Dirn,
    /// Motion phase
    pub behaviour: ElevatorBehaviour,
}

/// Full read view of one car, published after every committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorSnapshot {
    /// Car this snapshot belongs to
    pub car_id: CarId,
    /// Last floor the car reached
    pub current_floor: Floor,
    /// Travel direction
    pub dirn: Dirn,
    /// Motion phase
    pub behaviour: ElevatorBehaviour,
    /// Floor the car is heading for, if any
    pub target: Option<Floor>,
    /// Pending up-direction stops, ascending
    pub up_requests: Vec<Floor>,
    /// Pending down-direction stops, descending
    pub down_requests: Vec<Floor>,
    /// Floors with a call waiting for the opposite stop there to be served, ascending
    pub deferred_calls: Vec<Floor>,
}

impl ElevatorSnapshot {
    /// Direction and phase only.
    pub fn car_state(&self) -> CarState {
        CarState { current_floor: self.current_floor, dirn: self.dirn, behaviour: self.behaviour }
    }

    /// Flattened status for the store.
    pub fn status(&self) -> ElevatorStatus {
        ElevatorStatus::from(self.dirn)
    }

    /// Total number of pending stops, deferred calls included.
    pub fn pending(&self) -> usize {
        self.up_requests.len() + self.down_requests.len() + self.deferred_calls.len()
    }
}

/// One store record per car: `currentFloor`, `state`, `up`, `down`, `deferred`.
///
/// `deferred` lists floors whose call goes the other way than the stop pending there. It may
/// be missing in older records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Last floor the car reached
    #[serde(rename = "currentFloor")]
    pub current_floor: Floor,
    /// Flattened direction
    pub state: ElevatorStatus,
    /// Up-direction stops, ascending
    pub up: Vec<Floor>,
    /// Down-direction stops, descending
    pub down: Vec<Floor>,
    /// Floors with a deferred call, ascending
    #[serde(default)]
    pub deferred: Vec<Floor>,
}

impl From<&ElevatorSnapshot> for PersistedState {
    fn from(snapshot: &ElevatorSnapshot) -> Self {
        Self {
            current_floor: snapshot.current_floor,
            state: snapshot.status(),
            up: snapshot.up_requests.clone(),
            down: snapshot.down_requests.clone(),
            deferred: snapshot.deferred_calls.clone(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(dirn: Dirn, behaviour: ElevatorBehaviour) -> ElevatorSnapshot {
        ElevatorSnapshot {
            car_id: 0,
            current_floor: 5,
            dirn,
            behaviour,
            target: Some(8),
            up_requests: vec![6, 8],
            down_requests: vec![3],
            deferred_calls: vec![],
        }
    }

    #[test]
    fn direction_flattens_regardless_of_phase() {
        assert_eq!(snapshot(Dirn::Up, ElevatorBehaviour::DoorOpen).status(), ElevatorStatus::GoingUp);
        assert_eq!(snapshot(Dirn::Down, ElevatorBehaviour::Moving).status(), ElevatorStatus::GoingDown);
        assert_eq!(snapshot(Dirn::Idle, ElevatorBehaviour::Stopped).status(), ElevatorStatus::Idle);
    }

    #[test]
    fn status_maps_back_to_direction() {
        for dirn in [Dirn::Up, Dirn::Down, Dirn::Idle] {
            assert_eq!(Dirn::from(ElevatorStatus::from(dirn)), dirn);
        }
    }

    #[test]
    fn persisted_record_uses_store_field_names() {
        let record = PersistedState::from(&snapshot(Dirn::Up, ElevatorBehaviour::Moving));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["currentFloor"], 5);
        assert_eq!(json["state"], "going_up");
        assert_eq!(json["up"], serde_json::json!([6, 8]));
        assert_eq!(json["down"], serde_json::json!([3]));
    }

    #[test]
    fn record_without_deferred_field_still_loads() {
        let json = r#"{"currentFloor": 4, "state": "going_down", "up": [], "down": [2]}"#;
        let record: PersistedState = serde_json::from_str(json).unwrap();
        assert_eq!(record.down, vec![2]);
        assert!(record.deferred.is_empty());
    }

    #[test]
    fn state_strings_match_stored_values() {
        assert_eq!(ElevatorStatus::Idle.as_str(), "idle");
        assert_eq!(
            serde_json::to_string(&ElevatorStatus::GoingDown).unwrap(),
            format!("\"{}\"", ElevatorStatus::GoingDown.as_str())
        );
    }
}
