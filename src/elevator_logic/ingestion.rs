//! Request ingestion: validates and classifies incoming requests and routes them into
//! the right request set of a car.
//!
//! - In-car requests ([Request::Go]) infer their set from the floor's position relative
//!   to the car.
//! - Floor calls ([Request::Call]) carry their own direction and go into that set no matter
//!   where the car is. A call at a floor pending the other way waits until that stop is served.

use crate::elevator_logic::fsm::{ElevatorCar, RequestOutcome};
use crate::elevator_logic::Floor;
use crate::error::{Error, Result};
use crate::print;
use crate::snapshot::Dirn;

/// A request as it arrives from the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Passenger inside the car wants to go to a floor
    Go(Floor),
    /// Waiting passenger at `floor` wants to travel in `dirn`
    Call {
        /// Floor the call was made from
        floor: Floor,
        /// Intended travel direction
        dirn: Dirn,
    },
}

impl Request {
    /// Floor the request concerns.
    pub fn floor(&self) -> Floor {
        match self {
            Request::Go(floor) => *floor,
            Request::Call { floor, .. } => *floor,
        }
    }
}

/// Parses the direction of a floor call. Accepts `up` and `down`, case-insensitive.
pub fn parse_direction(text: &str) -> Result<Dirn> {
    match text.trim().to_lowercase().as_str() {
        "up" => Ok(Dirn::Up),
        "down" => Ok(Dirn::Down),
        other => Err(Error::InvalidDirection(other.to_string())),
    }
}

/// Decides which set a request belongs in.
///
/// ## Returns
/// - `Ok(Some(dirn))`: insert into the up-set or down-set
/// - `Ok(None)`: in-car request for the current floor, nothing to do
/// - [Error::InvalidDirection] for a call without `Up`/`Down`
pub fn classify(car: &ElevatorCar, request: &Request) -> Result<Option<Dirn>> {
    match *request {
        Request::Go(floor) => {
            let current = car.current_floor();
            if floor > current {
                Ok(Some(Dirn::Up))
            } else if floor < current {
                Ok(Some(Dirn::Down))
            } else {
                Ok(None)
            }
        }
        Request::Call { dirn: Dirn::Idle, .. } => Err(Error::InvalidDirection("idle".to_string())),
        Request::Call { dirn, .. } => Ok(Some(dirn)),
    }
}

/// Validates `request` and inserts it into `car`.
///
/// Out-of-range floors fail with [Error::InvalidFloor] before anything else is looked at,
/// and never reach a request set.
pub fn submit(car: &mut ElevatorCar, request: Request) -> Result<RequestOutcome> {
    let floor = request.floor();
    if let Err(e) = car.check_floor(floor) {
        print::warn(format!("Car {}: rejected {:?}: {}", car.car_id(), request, e));
        return Err(e);
    }

    let dirn = match classify(car, &request) {
        Ok(Some(dirn)) => dirn,
        Ok(None) => {
            print::info(format!("Car {}: already at the requested floor {}", car.car_id(), floor));
            return Ok(RequestOutcome::AlreadyHere);
        }
        Err(e) => {
            print::warn(format!("Car {}: rejected {:?}: {}", car.car_id(), request, e));
            return Err(e);
        }
    };

    match request {
        Request::Go(_) => print::info(format!(
            "Car {}: internal call to floor {} from floor {}", car.car_id(), floor, car.current_floor()
        )),
        Request::Call { .. } => print::info(format!(
            "Car {}: external call from floor {} going {:?}, car at floor {}", car.car_id(), floor, dirn, car.current_floor()
        )),
    }

    let outcome = match request {
        Request::Go(_) => car.add_request(floor, dirn),
        Request::Call { .. } => car.add_call(floor, dirn),
    };
    if let Err(e) = &outcome {
        print::warn(format!("Car {}: rejected {:?}: {}", car.car_id(), request, e));
    }
    outcome
}

/// In-car request: go to `floor`.
pub fn go_to(car: &mut ElevatorCar, floor: Floor) -> Result<RequestOutcome> {
    submit(car, Request::Go(floor))
}

/// Floor call from `floor` wanting to travel in `dirn`.
pub fn call(car: &mut ElevatorCar, floor: Floor, dirn: Dirn) -> Result<RequestOutcome> {
    submit(car, Request::Call { floor, dirn })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElevatorConfig;

    fn car_at(floor: Floor) -> ElevatorCar {
        let config = ElevatorConfig { home_floor: floor, ..ElevatorConfig::default() };
        ElevatorCar::new(0, &config)
    }

    #[test]
    fn internal_request_infers_set_from_position() {
        let mut car = car_at(5);
        assert_eq!(go_to(&mut car, 8), Ok(RequestOutcome::Queued(Dirn::Up)));
        assert_eq!(go_to(&mut car, 2), Ok(RequestOutcome::Queued(Dirn::Down)));
        assert_eq!(car.up_requests().to_vec(), vec![8]);
        assert_eq!(car.down_requests().to_vec(), vec![2]);
    }

    #[test]
    fn internal_request_for_current_floor_is_a_no_op() {
        let mut car = car_at(5);
        assert_eq!(go_to(&mut car, 5), Ok(RequestOutcome::AlreadyHere));
        assert_eq!(car.pending_stops(), 0);
    }

    #[test]
    fn external_call_uses_its_own_direction() {
        let mut car = car_at(5);
        // Up-call from below the car still goes in the up-set
        assert_eq!(call(&mut car, 2, Dirn::Up), Ok(RequestOutcome::Queued(Dirn::Up)));
        // Down-call from above the car still goes in the down-set
        assert_eq!(call(&mut car, 9, Dirn::Down), Ok(RequestOutcome::Queued(Dirn::Down)));
        assert_eq!(car.up_requests().to_vec(), vec![2]);
        assert_eq!(car.down_requests().to_vec(), vec![9]);
    }

    #[test]
    fn duplicate_external_call_collapses() {
        let mut car = car_at(1);
        call(&mut car, 4, Dirn::Up).unwrap();
        let once = car.snapshot();
        assert_eq!(call(&mut car, 4, Dirn::Up), Ok(RequestOutcome::AlreadyPending));
        assert_eq!(car.snapshot(), once);
    }

    #[test]
    fn opposite_call_at_pending_floor_is_deferred() {
        let mut car = car_at(1);
        go_to(&mut car, 5).unwrap();
        assert_eq!(call(&mut car, 5, Dirn::Down), Ok(RequestOutcome::Deferred(Dirn::Down)));
        assert_eq!(call(&mut car, 5, Dirn::Down), Ok(RequestOutcome::AlreadyPending));
        assert_eq!(car.up_requests().to_vec(), vec![5]);
        assert!(car.down_requests().is_empty());
        assert_eq!(car.deferred_calls(), vec![5]);
    }

    #[test]
    fn in_car_request_merges_with_any_stop() {
        let mut car = car_at(1);
        call(&mut car, 5, Dirn::Down).unwrap();
        assert_eq!(go_to(&mut car, 5), Ok(RequestOutcome::AlreadyPending));
        assert!(car.deferred_calls().is_empty());
        assert_eq!(car.pending_stops(), 1);
    }

    #[test]
    fn out_of_range_floors_are_rejected() {
        let mut car = car_at(1);
        assert!(matches!(go_to(&mut car, 0), Err(Error::InvalidFloor { floor: 0, .. })));
        assert!(matches!(call(&mut car, 21, Dirn::Down), Err(Error::InvalidFloor { floor: 21, .. })));
        // Range is checked before the direction
        assert!(matches!(call(&mut car, 30, Dirn::Idle), Err(Error::InvalidFloor { .. })));
        assert_eq!(car.pending_stops(), 0);
    }

    #[test]
    fn call_without_direction_is_rejected() {
        let mut car = car_at(1);
        assert!(matches!(call(&mut car, 3, Dirn::Idle), Err(Error::InvalidDirection(_))));
        assert_eq!(car.pending_stops(), 0);
    }

    #[test]
    fn direction_text_is_parsed() {
        assert_eq!(parse_direction("up"), Ok(Dirn::Up));
        assert_eq!(parse_direction(" DOWN "), Ok(Dirn::Down));
        assert!(matches!(parse_direction("sideways"), Err(Error::InvalidDirection(_))));
    }
}
