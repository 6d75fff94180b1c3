//! Car selection for floor calls.
//!
//! Before a floor call is ingested, a [CarSelector] picks the car that answers it. It only
//! gets a read-only view of the cars (their snapshots), so cars never share mutable state.
//! - [ConstantSelector]: single-car buildings, always the same car
//! - [NearestCarSelector]: cost based, distance plus penalties for busy cars and cars
//!   heading away from the call

use crate::config;
use crate::elevator_logic::{CarId, Floor};
use crate::snapshot::{Dirn, ElevatorSnapshot};

/// Chooses which car answers a floor call.
pub trait CarSelector: Send + Sync {
    /// Returns the id of the chosen car, or `None` if `cars` is empty.
    fn select_car(&self, cars: &[ElevatorSnapshot], floor: Floor, dirn: Dirn) -> Option<CarId>;
}

/// Always picks the same car.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantSelector(pub CarId);

impl CarSelector for ConstantSelector {
    fn select_car(&self, cars: &[ElevatorSnapshot], _floor: Floor, _dirn: Dirn) -> Option<CarId> {
        cars.iter().find(|car| car.car_id == self.0).map(|car| car.car_id)
    }
}

/// Picks the car with the lowest [compute_cost]. Ties go to the lowest car id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCarSelector;

impl CarSelector for NearestCarSelector {
    fn select_car(&self, cars: &[ElevatorSnapshot], floor: Floor, dirn: Dirn) -> Option<CarId> {
        cars.iter()
            .min_by_key(|car| (compute_cost(car, floor, dirn), car.car_id))
            .map(|car| car.car_id)
    }
}

/// Cost of sending `car` to a call at `floor` going `dirn`.
///
/// Base cost is the distance in floors. A car with pending stops gets
/// [config::BUSY_PENALTY], and a car travelling away from the call gets
/// [config::WRONG_DIRECTION_PENALTY]. A car moving toward the floor but opposite to the
/// call's direction gets another [config::BUSY_PENALTY].
pub fn compute_cost(car: &ElevatorSnapshot, floor: Floor, dirn: Dirn) -> u32 {
    // Grunnkostnaden er avstanden mellom heisa og kallet
    let mut cost = car.current_floor.abs_diff(floor);

    if car.pending() > 0 {
        cost = cost.saturating_add(config::BUSY_PENALTY);
    }

    if !is_moving_toward(car, floor) {
        cost = cost.saturating_add(config::WRONG_DIRECTION_PENALTY);
    } else if car.dirn != Dirn::Idle && car.dirn != dirn && car.current_floor != floor {
        // På veg mot kallet, men skal snu etterpå
        cost = cost.saturating_add(config::BUSY_PENALTY);
    }
    cost
}

/// `true` if the car can reach `floor` without turning around.
///
/// Idle cars can go either way.
pub fn is_moving_toward(car: &ElevatorSnapshot, floor: Floor) -> bool {
    match car.dirn {
        Dirn::Up => floor >= car.current_floor,
        Dirn::Down => floor <= car.current_floor,
        Dirn::Idle => true,
    }
}
