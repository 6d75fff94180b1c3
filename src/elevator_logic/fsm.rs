//! The car state machine.
//!
//! [ElevatorCar] owns the current floor, the travel direction, the motion phase and the two
//! request sets. All transitions go through its methods:
//! - [ElevatorCar::add_request]: a validated request enters a set and the plan is re-evaluated
//! - [ElevatorCar::add_call]: same for floor calls, which may have to wait for the stop at
//!   their floor to be served first
//! - [ElevatorCar::on_arrival]: the mover reached a floor; a served stop opens the doors
//! - [ElevatorCar::on_dwell_elapsed]: doors close and the next target is chosen
//! - [ElevatorCar::reset]: both sets cleared, car parked
//!
//! The car itself never sleeps or blocks. Timing belongs to the mover.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::config::ElevatorConfig;
use crate::elevator_logic::request::{self, DirnTarget};
use crate::elevator_logic::request_set::FloorRequestSet;
use crate::elevator_logic::{CarId, Floor};
use crate::error::{Error, Result};
use crate::print;
use crate::snapshot::{Dirn, ElevatorBehaviour, ElevatorSnapshot, PersistedState};

/// What a request did to the request sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Floor added to the up-set (`Dirn::Up`) or the down-set (`Dirn::Down`)
    Queued(Dirn),
    /// Floor call at a floor already pending in the other set. It is queued in its own set
    /// once that stop has been served.
    Deferred(Dirn),
    /// Floor was already a pending stop; nothing changed
    AlreadyPending,
    /// In-car request for the floor the car is on; nothing changed
    AlreadyHere,
}

/// Result of an arrival event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// The floor was a pending stop; it was removed and the doors opened
    Served(Floor),
    /// The car passed the floor without stopping
    Passed(Floor),
    /// The car was not moving; the event was dropped
    Ignored,
}

/// One elevator car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatorCar {
    car_id: CarId,
    current_floor: Floor,
    dirn: Dirn,
    behaviour: ElevatorBehaviour,
    target: Option<DirnTarget>,
    up_requests: FloorRequestSet,
    down_requests: FloorRequestSet,
    // Floors holding a call opposite to the set they are pending in
    deferred_calls: BTreeSet<Floor>,
    min_floor: Floor,
    max_floor: Floor,
    capacity: usize,
}

impl ElevatorCar {
    /// Creates an idle car parked at the configured home floor.
    pub fn new(car_id: CarId, config: &ElevatorConfig) -> Self {
        Self {
            car_id,
            current_floor: config.home_floor,
            dirn: Dirn::Idle,
            behaviour: ElevatorBehaviour::Stopped,
            target: None,
            up_requests: FloorRequestSet::new(Dirn::Up, config.min_floor, config.max_floor),
            down_requests: FloorRequestSet::new(Dirn::Down, config.min_floor, config.max_floor),
            deferred_calls: BTreeSet::new(),
            min_floor: config.min_floor,
            max_floor: config.max_floor,
            capacity: config.capacity,
        }
    }

    /// Rebuilds a car from its stored record.
    ///
    /// The car comes back stopped. A stored floor outside the range falls back to the home
    /// floor, stored stops outside the range are dropped, and the plan is re-evaluated so the
    /// stored direction only survives if there is still work in it.
    pub fn from_persisted(car_id: CarId, config: &ElevatorConfig, state: &PersistedState) -> Self {
        let mut car = Self::new(car_id, config);

        if config.contains(state.current_floor) {
            car.current_floor = state.current_floor;
        } else {
            print::warn(format!(
                "Car {}: stored floor {} is outside [{}, {}], starting at home floor {}",
                car_id, state.current_floor, config.min_floor, config.max_floor, config.home_floor
            ));
        }
        car.dirn = Dirn::from(state.state);

        for (floors, dirn) in [(&state.up, Dirn::Up), (&state.down, Dirn::Down)] {
            for floor in floors {
                if car.is_pending(*floor) {
                    continue;
                }
                if let Err(e) = car.set_mut(dirn).insert(*floor) {
                    print::warn(format!("Car {}: dropping stored stop: {}", car_id, e));
                }
            }
        }
        for floor in &state.deferred {
            if car.is_pending(*floor) {
                car.deferred_calls.insert(*floor);
            } else {
                print::warn(format!("Car {}: dropping stored call at floor {} without a stop", car_id, floor));
            }
        }
        car.evaluate();
        car
    }

    /// Id of this car.
    pub fn car_id(&self) -> CarId {
        self.car_id
    }

    /// Last floor the car reached.
    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    /// Travel direction.
    pub fn dirn(&self) -> Dirn {
        self.dirn
    }

    /// Motion phase.
    pub fn behaviour(&self) -> ElevatorBehaviour {
        self.behaviour
    }

    /// Floor the car is heading for.
    pub fn target(&self) -> Option<Floor> {
        self.target.map(|t| t.target)
    }

    /// Full plan the car is following.
    pub fn plan(&self) -> Option<DirnTarget> {
        self.target
    }

    /// Pending up-direction stops.
    pub fn up_requests(&self) -> &FloorRequestSet {
        &self.up_requests
    }

    /// Pending down-direction stops.
    pub fn down_requests(&self) -> &FloorRequestSet {
        &self.down_requests
    }

    /// Floors with a deferred floor call, ascending.
    pub fn deferred_calls(&self) -> Vec<Floor> {
        self.deferred_calls.iter().copied().collect()
    }

    /// Number of pending stops in both sets, deferred calls included.
    pub fn pending_stops(&self) -> usize {
        self.up_requests.len() + self.down_requests.len() + self.deferred_calls.len()
    }

    /// Ceiling on pending stops.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` if `floor` is a pending stop in either set.
    pub fn is_pending(&self, floor: Floor) -> bool {
        self.up_requests.contains(floor) || self.down_requests.contains(floor)
    }

    /// [Error::InvalidFloor] unless `floor` is inside the served range.
    pub fn check_floor(&self, floor: Floor) -> Result<()> {
        if floor < self.min_floor || floor > self.max_floor {
            return Err(Error::InvalidFloor { floor, min: self.min_floor, max: self.max_floor });
        }
        Ok(())
    }

    fn set(&self, dirn: Dirn) -> &FloorRequestSet {
        match dirn {
            Dirn::Down => &self.down_requests,
            _ => &self.up_requests,
        }
    }

    fn set_mut(&mut self, dirn: Dirn) -> &mut FloorRequestSet {
        match dirn {
            Dirn::Down => &mut self.down_requests,
            _ => &mut self.up_requests,
        }
    }

    /// Queues `floor` in the set for `dirn` and re-evaluates the plan.
    ///
    /// A floor that is already pending in either set is merged into that stop. Used for
    /// in-car requests, where any stop at the floor will do.
    ///
    /// ## Returns
    /// - [RequestOutcome::Queued] or [RequestOutcome::AlreadyPending]
    /// - [Error::InvalidFloor] if the floor is out of range
    /// - [Error::InvalidDirection] if `dirn` is [Dirn::Idle]
    /// - [Error::CapacityExceeded] if a new stop would exceed the capacity
    pub fn add_request(&mut self, floor: Floor, dirn: Dirn) -> Result<RequestOutcome> {
        self.check_floor(floor)?;
        if dirn == Dirn::Idle {
            return Err(Error::InvalidDirection("idle".to_string()));
        }
        if self.is_pending(floor) {
            return Ok(RequestOutcome::AlreadyPending);
        }
        if self.pending_stops() >= self.capacity {
            return Err(Error::CapacityExceeded { limit: self.capacity });
        }

        self.set_mut(dirn).insert(floor)?;
        self.evaluate();
        Ok(RequestOutcome::Queued(dirn))
    }

    /// Queues a floor call at `floor` for travel in `dirn`.
    ///
    /// A call at a floor that is pending in the other set is not merged into that stop, since
    /// the car leaves it the wrong way. The call is deferred instead, and enters the set for
    /// `dirn` when the stop is served. A floor is thus never in both sets at once.
    ///
    /// ## Returns
    /// - [RequestOutcome::Queued], [RequestOutcome::Deferred] or [RequestOutcome::AlreadyPending]
    /// - the errors of [ElevatorCar::add_request]
    pub fn add_call(&mut self, floor: Floor, dirn: Dirn) -> Result<RequestOutcome> {
        self.check_floor(floor)?;
        if dirn == Dirn::Idle {
            return Err(Error::InvalidDirection("idle".to_string()));
        }
        if !self.set(dirn.reverse()).contains(floor) {
            return self.add_request(floor, dirn);
        }
        if self.deferred_calls.contains(&floor) {
            return Ok(RequestOutcome::AlreadyPending);
        }
        if self.pending_stops() >= self.capacity {
            return Err(Error::CapacityExceeded { limit: self.capacity });
        }

        self.deferred_calls.insert(floor);
        print::info(format!(
            "Car {}: call at floor {} going {:?} waits for the {:?} stop there",
            self.car_id, floor, dirn, dirn.reverse()
        ));
        Ok(RequestOutcome::Deferred(dirn))
    }

    // The stop at `floor` in `served` was just served; a waiting call there joins its own set.
    fn release_deferred(&mut self, floor: Floor, served: Dirn) {
        if !self.deferred_calls.remove(&floor) {
            return;
        }
        if let Err(e) = self.set_mut(served.reverse()).insert(floor) {
            print::err(format!("Car {}: lost deferred call at floor {}: {}", self.car_id, floor, e));
        }
    }

    /// Re-evaluates the plan according to the motion phase.
    ///
    /// - Stopped: pick a new direction and target, start moving, or go idle
    /// - Moving: adopt a new target only if it keeps the travel direction and lies ahead
    /// - DoorOpen: nothing; the plan is chosen when the doors close
    ///
    /// ## Returns
    /// The plan the car follows after evaluation.
    pub fn evaluate(&mut self) -> Option<DirnTarget> {
        match self.behaviour {
            ElevatorBehaviour::Stopped => {
                match request::choose_direction(self) {
                    Some(plan) => {
                        if self.dirn != plan.dirn || self.target != Some(plan) {
                            print::info(format!(
                                "Car {}: {:?} -> {:?}, target floor {}",
                                self.car_id, self.dirn, plan.dirn, plan.target
                            ));
                        }
                        self.dirn = plan.dirn;
                        self.target = Some(plan);
                        self.behaviour = ElevatorBehaviour::Moving;
                    }
                    None => {
                        if self.dirn != Dirn::Idle {
                            print::info(format!("Car {}: no more floors to go to, idle at {}", self.car_id, self.current_floor));
                        }
                        self.dirn = Dirn::Idle;
                        self.target = None;
                    }
                }
            }
            ElevatorBehaviour::Moving => {
                if let Some(plan) = request::choose_direction(self) {
                    // The car has already left `current_floor`
                    let ahead = plan.target != self.current_floor;
                    if ahead && request::keeps_direction(self, &plan) && self.target != Some(plan) {
                        print::info(format!("Car {}: new target floor {}", self.car_id, plan.target));
                        self.target = Some(plan);
                    }
                }
            }
            ElevatorBehaviour::DoorOpen => {}
        }
        self.target
    }

    /// Next floor the mover should bring the car to, one floor at a time.
    ///
    /// Returns the current floor when the car is already at its target, and `None`
    /// when the car is not moving.
    pub fn next_floor(&self) -> Option<Floor> {
        if self.behaviour != ElevatorBehaviour::Moving {
            return None;
        }
        let target = self.target?.target;
        let next = match target.cmp(&self.current_floor) {
            Ordering::Greater => self.current_floor + 1,
            Ordering::Less => self.current_floor - 1,
            Ordering::Equal => self.current_floor,
        };
        Some(next)
    }

    /// The car reached `floor`.
    ///
    /// If `floor` is the target, or a pending stop in the travel direction, exactly that one
    /// entry is removed and the doors open; a call deferred behind it moves into its own set.
    /// A deferred call going the way the car travels is served on its own. Otherwise only the
    /// current floor changes.
    pub fn on_arrival(&mut self, floor: Floor) -> Arrival {
        if self.behaviour != ElevatorBehaviour::Moving {
            return Arrival::Ignored;
        }
        self.current_floor = floor;

        let target = self.target;
        let served_by = match target {
            Some(plan) if plan.target == floor => Some(plan.served_by),
            _ if self.dirn != Dirn::Idle && self.set(self.dirn).contains(floor) => Some(self.dirn),
            _ => None,
        };

        match served_by {
            Some(set) => {
                self.set_mut(set).remove(floor);
                self.release_deferred(floor, set);
                self.open_door(floor)
            }
            None if self.dirn != Dirn::Idle && self.deferred_calls.contains(&floor) => {
                // The stop left in the set is the other direction's
                self.deferred_calls.remove(&floor);
                self.open_door(floor)
            }
            None => Arrival::Passed(floor),
        }
    }

    fn open_door(&mut self, floor: Floor) -> Arrival {
        self.target = None;
        self.behaviour = ElevatorBehaviour::DoorOpen;
        print::ok(format!("Car {}: reached floor {}, opening door", self.car_id, floor));
        Arrival::Served(floor)
    }

    /// The dwell period ended: doors close and the next target is chosen.
    pub fn on_dwell_elapsed(&mut self) -> Option<DirnTarget> {
        if self.behaviour != ElevatorBehaviour::DoorOpen {
            return self.target;
        }
        print::info(format!("Car {}: closing door at floor {}", self.car_id, self.current_floor));
        self.behaviour = ElevatorBehaviour::Stopped;
        self.evaluate()
    }

    /// Clears both request sets and parks the car where it is.
    pub fn reset(&mut self) {
        self.up_requests.clear();
        self.down_requests.clear();
        self.deferred_calls.clear();
        self.dirn = Dirn::Idle;
        self.behaviour = ElevatorBehaviour::Stopped;
        self.target = None;
        print::warn(format!("Car {}: reset at floor {}", self.car_id, self.current_floor));
    }

    /// Read view of the whole car.
    pub fn snapshot(&self) -> ElevatorSnapshot {
        ElevatorSnapshot {
            car_id: self.car_id,
            current_floor: self.current_floor,
            dirn: self.dirn,
            behaviour: self.behaviour,
            target: self.target(),
            up_requests: self.up_requests.to_vec(),
            down_requests: self.down_requests.to_vec(),
            deferred_calls: self.deferred_calls(),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_direction(&mut self, dirn: Dirn) {
        self.dirn = dirn;
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, floor: Floor, dirn: Dirn) {
        self.set_mut(dirn).insert(floor).unwrap();
    }
}
