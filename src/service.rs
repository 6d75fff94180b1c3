//! # ElevatorService
//!
//! The operations the transport layer calls: reading state, in-car requests, floor calls,
//! reset and simulation control.
//!
//! The service owns its cars explicitly through [CarHandle]s. It is cheap to clone, and
//! every clone talks to the same cars. Single-car operations ([ElevatorService::get_state],
//! [ElevatorService::go_to_floor], ...) address the first car; floor calls go through the
//! [CarSelector].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::config::ElevatorConfig;
use crate::elevator_logic::fsm::{ElevatorCar, RequestOutcome};
use crate::elevator_logic::mover::{self, SimulationFlag};
use crate::elevator_logic::{ingestion, CarHandle, CarId, Floor};
use crate::error::{Error, Result};
use crate::manager::{CarSelector, ConstantSelector, NearestCarSelector};
use crate::print;
use crate::snapshot::{CarState, Dirn, ElevatorSnapshot};
use crate::store::StateStore;
use crate::sync;

/// Which car took a floor call, and what the call did to its request sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallAssignment {
    /// Car chosen by the selector
    pub car_id: CarId,
    /// Effect on that car
    pub outcome: RequestOutcome,
}

/// Handle to the whole dispatch core.
#[derive(Clone)]
pub struct ElevatorService {
    cars: Arc<Vec<CarHandle>>,
    selector: Arc<dyn CarSelector>,
    running: SimulationFlag,
    config: Arc<ElevatorConfig>,
}

impl ElevatorService {
    /// Builds a service around existing cars.
    ///
    /// The simulation starts out running, but nothing moves until [ElevatorService::spawn_tasks]
    /// has started the movers.
    pub fn new(cars: Vec<ElevatorCar>, selector: Arc<dyn CarSelector>, config: ElevatorConfig) -> Self {
        Self {
            cars: Arc::new(cars.into_iter().map(CarHandle::new).collect()),
            selector,
            running: Arc::new(AtomicBool::new(true)),
            config: Arc::new(config),
        }
    }

    /// Fresh cars at the home floor, with the selector that fits the number of cars.
    pub fn from_config(config: ElevatorConfig) -> Self {
        let cars = (0..config.num_cars).map(|id| ElevatorCar::new(id, &config)).collect();
        Self::new(cars, default_selector(config.num_cars), config)
    }

    /// Configuration the service runs with.
    pub fn config(&self) -> &ElevatorConfig {
        &self.config
    }

    /// All car handles, ordered by car id.
    pub fn cars(&self) -> &[CarHandle] {
        &self.cars
    }

    /// Handle of `car_id`, or [Error::UnknownCar].
    pub fn car(&self, car_id: CarId) -> Result<&CarHandle> {
        self.cars
            .iter()
            .find(|handle| handle.car_id() == car_id)
            .ok_or(Error::UnknownCar(car_id))
    }

    fn primary(&self) -> Result<&CarHandle> {
        self.cars.first().ok_or(Error::UnknownCar(0))
    }

    /// Spawns one mover and one sync task per car.
    pub fn spawn_tasks(&self, store: Arc<dyn StateStore>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.cars.len() * 2);
        for car in self.cars.iter() {
            handles.push(tokio::spawn(mover::run_mover(
                car.clone(),
                self.running.clone(),
                self.config.travel_time,
                self.config.door_dwell,
            )));
            handles.push(tokio::spawn(sync::run_state_sync(store.clone(), car.subscribe())));
        }
        handles
    }

    /// `GetState`: floor, direction and phase of the first car.
    pub async fn get_state(&self) -> Result<CarState> {
        Ok(self.primary()?.snapshot().car_state())
    }

    /// `GetFloor`: current floor of the first car.
    pub async fn get_floor(&self) -> Result<Floor> {
        Ok(self.primary()?.snapshot().current_floor)
    }

    /// State of any car.
    pub async fn get_car_state(&self, car_id: CarId) -> Result<CarState> {
        Ok(self.car(car_id)?.snapshot().car_state())
    }

    /// Latest snapshot of every car.
    pub fn snapshots(&self) -> Vec<ElevatorSnapshot> {
        self.cars.iter().map(sync::read_state).collect()
    }

    /// `GoToFloor`: in-car request in the first car.
    pub async fn go_to_floor(&self, floor: Floor) -> Result<RequestOutcome> {
        let car_id = self.primary()?.car_id();
        self.go_to_floor_in(car_id, floor).await
    }

    /// In-car request in a given car.
    pub async fn go_to_floor_in(&self, car_id: CarId, floor: Floor) -> Result<RequestOutcome> {
        let handle = self.car(car_id)?;
        handle.update(|car| ingestion::go_to(car, floor)).await
    }

    /// `CallUp`: floor call from `floor` going up.
    pub async fn call_up(&self, floor: Floor) -> Result<CallAssignment> {
        self.call(floor, Dirn::Up).await
    }

    /// `CallDown`: floor call from `floor` going down.
    pub async fn call_down(&self, floor: Floor) -> Result<CallAssignment> {
        self.call(floor, Dirn::Down).await
    }

    /// Floor call in either direction. The floor is validated before a car is chosen.
    pub async fn call(&self, floor: Floor, dirn: Dirn) -> Result<CallAssignment> {
        if let Err(e) = self.config.check_floor(floor) {
            print::warn(format!("Rejected call from floor {}: {}", floor, e));
            return Err(e);
        }
        if dirn == Dirn::Idle {
            return Err(Error::InvalidDirection("idle".to_string()));
        }

        let car_id = self
            .selector
            .select_car(&self.snapshots(), floor, dirn)
            .ok_or_else(|| Error::Config("no car available for floor calls".to_string()))?;
        let outcome = self.car(car_id)?.update(|car| ingestion::call(car, floor, dirn)).await?;
        Ok(CallAssignment { car_id, outcome })
    }

    /// `Reset`: clears both request sets of every car and parks them.
    pub async fn reset(&self) {
        join_all(self.cars.iter().map(|handle| handle.update(|car| car.reset()))).await;
    }

    /// Resets a single car.
    pub async fn reset_car(&self, car_id: CarId) -> Result<()> {
        self.car(car_id)?.update(|car| car.reset()).await;
        Ok(())
    }

    /// Lets the movers run. Returns `false` if the simulation was already running.
    pub fn start_simulation(&self) -> bool {
        let started = !self.running.swap(true, Ordering::SeqCst);
        if started {
            print::ok("Simulation started".to_string());
        }
        started
    }

    /// Freezes the movers. Requests are still accepted. Returns `false` if already stopped.
    pub fn stop_simulation(&self) -> bool {
        let stopped = self.running.swap(false, Ordering::SeqCst);
        if stopped {
            print::warn("Simulation stopped".to_string());
        }
        stopped
    }

    /// `true` while the movers are allowed to move the cars.
    pub fn simulation_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// [ConstantSelector] for a single car, [NearestCarSelector] otherwise.
pub fn default_selector(num_cars: u8) -> Arc<dyn CarSelector> {
    if num_cars <= 1 {
        Arc::new(ConstantSelector(0))
    } else {
        Arc::new(NearestCarSelector)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ElevatorBehaviour;

    fn service(num_cars: u8) -> ElevatorService {
        ElevatorService::from_config(ElevatorConfig { num_cars, ..ElevatorConfig::default() })
    }

    #[tokio::test]
    async fn fresh_service_reports_home_floor() {
        let service = service(1);
        assert_eq!(service.get_floor().await, Ok(1));
        let state = service.get_state().await.unwrap();
        assert_eq!(state.dirn, Dirn::Idle);
        assert_eq!(state.behaviour, ElevatorBehaviour::Stopped);
    }

    #[tokio::test]
    async fn go_to_floor_queues_and_starts_the_car() {
        let service = service(1);
        assert_eq!(service.go_to_floor(5).await, Ok(RequestOutcome::Queued(Dirn::Up)));
        let state = service.get_state().await.unwrap();
        assert_eq!(state.dirn, Dirn::Up);
        assert_eq!(state.behaviour, ElevatorBehaviour::Moving);
        assert_eq!(service.go_to_floor(1).await, Ok(RequestOutcome::AlreadyHere));
    }

    #[tokio::test]
    async fn invalid_floor_is_rejected_before_selection() {
        let service = service(2);
        assert!(matches!(service.call_up(0).await, Err(Error::InvalidFloor { .. })));
        assert!(matches!(service.call_down(99).await, Err(Error::InvalidFloor { .. })));
        assert!(matches!(service.go_to_floor(-3).await, Err(Error::InvalidFloor { .. })));
        assert!(service.snapshots().iter().all(|s| s.pending() == 0));
    }

    #[tokio::test]
    async fn calls_land_in_their_own_set() {
        let service = service(1);
        let up = service.call_up(7).await.unwrap();
        let down = service.call_down(4).await.unwrap();
        assert_eq!(up, CallAssignment { car_id: 0, outcome: RequestOutcome::Queued(Dirn::Up) });
        assert_eq!(down.outcome, RequestOutcome::Queued(Dirn::Down));

        let snapshot = &service.snapshots()[0];
        assert_eq!(snapshot.up_requests, vec![7]);
        assert_eq!(snapshot.down_requests, vec![4]);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let service = service(1);
        service.go_to_floor(9).await.unwrap();
        service.call_down(3).await.unwrap();
        service.reset().await;

        let snapshot = &service.snapshots()[0];
        assert_eq!(snapshot.pending(), 0);
        assert_eq!(snapshot.dirn, Dirn::Idle);
        assert_eq!(snapshot.behaviour, ElevatorBehaviour::Stopped);
    }

    #[tokio::test]
    async fn multi_car_calls_go_to_the_nearest_car() {
        let config = ElevatorConfig { num_cars: 2, ..ElevatorConfig::default() };
        let cars = vec![
            ElevatorCar::new(0, &config),
            ElevatorCar::new(1, &ElevatorConfig { home_floor: 15, ..config.clone() }),
        ];
        let service = ElevatorService::new(cars, default_selector(2), config);

        assert_eq!(service.call_down(14).await.unwrap().car_id, 1);
        assert_eq!(service.call_up(2).await.unwrap().car_id, 0);
        assert_eq!(service.get_car_state(1).await.unwrap().dirn, Dirn::Down);
    }

    #[tokio::test]
    async fn unknown_car_is_reported() {
        let service = service(1);
        assert_eq!(service.go_to_floor_in(4, 3).await, Err(Error::UnknownCar(4)));
        assert_eq!(service.get_car_state(2).await, Err(Error::UnknownCar(2)));
        assert_eq!(service.reset_car(7).await, Err(Error::UnknownCar(7)));
    }

    #[test]
    fn simulation_switch_reports_changes() {
        let service = service(1);
        assert!(service.simulation_running());
        assert!(!service.start_simulation());
        assert!(service.stop_simulation());
        assert!(!service.stop_simulation());
        assert!(!service.simulation_running());
        assert!(service.start_simulation());
    }
}
