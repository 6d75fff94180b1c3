//! Snapshot reads and write-through to the store.
//!
//! Memory is authoritative. Every committed transition publishes a snapshot on the car's
//! watch channel, and [run_state_sync] writes the newest one to the store. Since only
//! published snapshots are written, the store is never ahead of memory. It may lag behind
//! while the store is down, and catches up on the first successful save.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::sleep;

use crate::config;
use crate::elevator_logic::{CarHandle, CarId};
use crate::error::{Error, Result};
use crate::print;
use crate::snapshot::{ElevatorSnapshot, PersistedState};
use crate::store::StateStore;

/// Current in-memory state of a car. No side effects.
pub fn read_state(handle: &CarHandle) -> ElevatorSnapshot {
    handle.snapshot()
}

/// The store's mirror of a car, as last written.
pub fn read_stored(store: &dyn StateStore, car_id: CarId) -> Result<PersistedState> {
    store.load(car_id)
}

/// Flushes `snapshot` to the store once. A failure is logged and returned; nothing is retried here.
pub fn write_state(store: &dyn StateStore, snapshot: &ElevatorSnapshot) -> Result<()> {
    let record = PersistedState::from(snapshot);
    match store.save(snapshot.car_id, &record) {
        Ok(()) => Ok(()),
        Err(e) => {
            print::err(format!("Car {}: could not write state: {}", snapshot.car_id, e));
            Err(e)
        }
    }
}

/// [write_state] on tokio's blocking pool, off the threads the movers run on.
pub async fn write_state_blocking(store: &Arc<dyn StateStore>, snapshot: &ElevatorSnapshot) -> Result<()> {
    let store = store.clone();
    let snapshot = snapshot.clone();
    match tokio::task::spawn_blocking(move || write_state(store.as_ref(), &snapshot)).await {
        Ok(result) => result,
        Err(e) => {
            print::err(format!("Store write task failed: {}", e));
            Err(Error::StoreUnavailable(e.to_string()))
        }
    }
}

/// Write-through task for one car.
///
/// Saves the current snapshot, then every published change. Saves that fail are retried
/// after [config::STORE_RETRY_PERIOD] or as soon as a newer snapshot arrives, whichever
/// comes first; the newest snapshot always wins. Returns when the car's handle is gone.
pub async fn run_state_sync(store: Arc<dyn StateStore>, mut snapshot_rx: watch::Receiver<ElevatorSnapshot>) {
    let mut pending = Some(snapshot_rx.borrow_and_update().clone());
    let mut failing = false;

    loop {
        if let Some(snapshot) = pending.take() {
            match write_state_blocking(&store, &snapshot).await {
                Ok(()) => {
                    if failing {
                        print::ok(format!("Car {}: store reachable again, state written", snapshot.car_id));
                        failing = false;
                    }
                }
                Err(_) => {
                    failing = true;
                    pending = Some(snapshot);
                }
            }
        }

        if pending.is_some() {
            tokio::select! {
                changed = snapshot_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    pending = Some(snapshot_rx.borrow_and_update().clone());
                }
                _ = sleep(config::STORE_RETRY_PERIOD) => {}
            }
        } else {
            if snapshot_rx.changed().await.is_err() {
                return;
            }
            pending = Some(snapshot_rx.borrow_and_update().clone());
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElevatorConfig;
    use crate::elevator_logic::fsm::ElevatorCar;
    use crate::error::Error;
    use crate::snapshot::{Dirn, ElevatorStatus};
    use crate::store::MemoryStore;
    use std::time::Duration;

    /// Store whose saves hold the calling thread for a while.
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    impl StateStore for SlowStore {
        fn load(&self, car_id: CarId) -> Result<PersistedState> {
            self.inner.load(car_id)
        }

        fn save(&self, car_id: CarId, state: &PersistedState) -> Result<()> {
            std::thread::sleep(self.delay);
            self.inner.save(car_id, state)
        }
    }

    fn handle() -> CarHandle {
        CarHandle::new(ElevatorCar::new(0, &ElevatorConfig::default()))
    }

    #[test]
    fn write_state_flattens_the_snapshot() {
        let store = MemoryStore::new();
        let mut car = ElevatorCar::new(0, &ElevatorConfig::default());
        car.add_request(6, Dirn::Up).unwrap();
        write_state(&store, &car.snapshot()).unwrap();

        let stored = read_stored(&store, 0).unwrap();
        assert_eq!(stored.current_floor, 1);
        assert_eq!(stored.state, ElevatorStatus::GoingUp);
        assert_eq!(stored.up, vec![6]);
    }

    #[test]
    fn write_state_reports_outage() {
        let store = MemoryStore::new();
        store.set_available(false);
        let car = ElevatorCar::new(0, &ElevatorConfig::default());
        assert!(matches!(write_state(&store, &car.snapshot()), Err(Error::StoreUnavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn published_changes_reach_the_store() {
        let store = Arc::new(MemoryStore::new());
        let handle = handle();
        let task = tokio::spawn(run_state_sync(store.clone(), handle.subscribe()));

        handle.update(|car| car.add_request(9, Dirn::Up)).await.unwrap();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(read_stored(store.as_ref(), 0).unwrap().up, vec![9]);
        assert_eq!(read_state(&handle).up_requests, vec![9]);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn outage_does_not_block_the_car_and_store_catches_up() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);
        let handle = handle();
        let task = tokio::spawn(run_state_sync(store.clone(), handle.subscribe()));

        handle.update(|car| car.add_request(5, Dirn::Up)).await.unwrap();
        handle.update(|car| car.add_request(2, Dirn::Down)).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(read_state(&handle).pending(), 2);
        assert!(matches!(read_stored(store.as_ref(), 0), Err(Error::StoreUnavailable(_))));

        store.set_available(true);
        sleep(config::STORE_RETRY_PERIOD * 2).await;
        let stored = read_stored(store.as_ref(), 0).unwrap();
        assert_eq!(stored.up, vec![5]);
        assert_eq!(stored.down, vec![2]);
        task.abort();
    }

    #[tokio::test]
    async fn slow_store_does_not_hold_up_the_runtime() {
        let store = Arc::new(SlowStore { inner: MemoryStore::new(), delay: Duration::from_millis(400) });
        let handle = handle();
        let task = tokio::spawn(run_state_sync(store.clone(), handle.subscribe()));

        // Single-threaded runtime: this only finishes early if the save runs elsewhere
        let started = std::time::Instant::now();
        for _ in 0..5 {
            sleep(Duration::from_millis(10)).await;
        }
        assert!(started.elapsed() < Duration::from_millis(300), "runtime stalled for {:?}", started.elapsed());

        drop(handle);
        task.await.unwrap();
        assert_eq!(store.inner.saves(), 1);
    }

    #[tokio::test]
    async fn task_ends_with_the_car() {
        let store = Arc::new(MemoryStore::new());
        let handle = handle();
        let task = tokio::spawn(run_state_sync(store.clone(), handle.subscribe()));
        drop(handle);
        task.await.unwrap();
        assert_eq!(store.saves(), 1);
    }
}
