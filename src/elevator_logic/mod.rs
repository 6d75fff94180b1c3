//! The dispatch core of one car, and the handle the rest of the crate shares it through.
//!
//! - [request_set]: ordered pending stops for one direction
//! - [request]: picks the next direction and target
//! - [fsm]: the car state machine
//! - [ingestion]: validates and routes incoming requests
//! - [timer] and [mover]: the clock side, driving travel and door dwell

pub mod request_set;
pub mod request;
pub mod fsm;
pub mod ingestion;
pub mod timer;
pub mod mover;

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::snapshot::ElevatorSnapshot;
use fsm::ElevatorCar;

/// A floor number. May be negative for basements.
pub type Floor = i32;

/// Identifies a car in the building.
pub type CarId = u8;


/// Shared handle to one car.
///
/// The car sits behind a mutex, so every mutation is serialized. After each mutation the
/// new [ElevatorSnapshot] is published on a watch channel while the lock is still held,
/// which keeps published snapshots in the same order as the transitions that made them.
#[derive(Clone)]
pub struct CarHandle {
    car_id: CarId,
    car: Arc<Mutex<ElevatorCar>>,
    snapshot_tx: Arc<watch::Sender<ElevatorSnapshot>>,
}

impl CarHandle {
    /// Wraps `car` and publishes its first snapshot.
    pub fn new(car: ElevatorCar) -> Self {
        let (snapshot_tx, _) = watch::channel(car.snapshot());
        Self {
            car_id: car.car_id(),
            car: Arc::new(Mutex::new(car)),
            snapshot_tx: Arc::new(snapshot_tx),
        }
    }

    /// Id of the wrapped car.
    pub fn car_id(&self) -> CarId {
        self.car_id
    }

    /// Receiver that sees every published snapshot. Used by the sync task.
    pub fn subscribe(&self) -> watch::Receiver<ElevatorSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Latest published snapshot, without taking the car lock.
    pub fn snapshot(&self) -> ElevatorSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Runs `f` on the locked car and publishes the snapshot if anything changed.
    pub async fn update<R>(&self, f: impl FnOnce(&mut ElevatorCar) -> R) -> R {
        let mut car = self.car.lock().await;
        let result = f(&mut car);
        let snapshot = car.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current != snapshot {
                *current = snapshot;
                true
            } else {
                false
            }
        });
        result
    }

    /// Runs `f` on the locked car without mutating it.
    pub async fn read<R>(&self, f: impl FnOnce(&ElevatorCar) -> R) -> R {
        let car = self.car.lock().await;
        f(&car)
    }
}
