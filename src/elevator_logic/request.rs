//! Dispatch policy: choosing the car's next direction and target.
//!
//! The logic is stateless and purely functional: every function takes a snapshot of the
//! car ([`ElevatorCar`]) and returns a [`DirnTarget`], or `None` when the car should go idle.
//!
//! # Overview
//! The policy implements collective control. A car that is already travelling serves every
//! stop ahead of it in its direction before it turns around.
//! - Moving up: next up-stop at or above the car, else reverse to the nearest down-stop at or
//!   below, else keep climbing to the highest down-stop, else descend to the lowest up-stop.
//! - Moving down: mirror image.
//! - Idle: the nearer of the two sets' nearest stops, ties go up.
//!
//! # Example
//! ```rust
//! use elevatordispatch::config::ElevatorConfig;
//! use elevatordispatch::elevator_logic::{fsm::ElevatorCar, request::choose_direction};
//! use elevatordispatch::snapshot::Dirn;
//!
//! let config = ElevatorConfig { home_floor: 5, ..ElevatorConfig::default() };
//! let mut car = ElevatorCar::new(0, &config);
//! car.add_request(3, Dirn::Down).unwrap();
//! let next = choose_direction(&car).unwrap();
//! assert_eq!((next.dirn, next.target), (Dirn::Down, 3));
//! ```

use crate::elevator_logic::fsm::ElevatorCar;
use crate::elevator_logic::Floor;
use crate::snapshot::Dirn;

/// Represents a combination of a travel direction and the stop the car heads for.
///
/// Typically used as the return type of [choose_direction].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirnTarget {
    /// direction the car travels in to reach `target`
    pub dirn: Dirn,

    /// the floor to stop at
    pub target: Floor,

    /// which request set (`Up` or `Down`) the stop is taken from
    pub served_by: Dirn,
}

impl DirnTarget {
    fn new(dirn: Dirn, target: Floor, served_by: Dirn) -> Self {
        Self { dirn, target, served_by }
    }

    fn distance(&self, from: Floor) -> u32 {
        self.target.abs_diff(from)
    }
}

/// Main decision logic to determine the car's next direction and target.
///
/// ## Returns
/// - `Some(DirnTarget)` with the chosen direction, stop, and the set the stop belongs to
/// - `None` if both request sets are empty and the car should go idle
pub fn choose_direction(car: &ElevatorCar) -> Option<DirnTarget> {
    match car.dirn() {
        Dirn::Up => plan_up(car),
        Dirn::Down => plan_down(car),
        Dirn::Idle => plan_idle(car),
    }
}

/// Plan while travelling up.
fn plan_up(car: &ElevatorCar) -> Option<DirnTarget> {
    let floor = car.current_floor();
    let up = car.up_requests();
    let down = car.down_requests();

    if let Some(target) = up.peek_nearest(floor) {
        return Some(DirnTarget::new(Dirn::Up, target, Dirn::Up));
    }
    if let Some(target) = down.peek_nearest(floor) {
        return Some(DirnTarget::new(Dirn::Down, target, Dirn::Down));
    }
    // Only stops on the far side of a turn remain
    if let Some(target) = down.first().filter(|f| *f > floor) {
        return Some(DirnTarget::new(Dirn::Up, target, Dirn::Down));
    }
    up.first()
        .filter(|f| *f < floor)
        .map(|target| DirnTarget::new(Dirn::Down, target, Dirn::Up))
}

/// Plan while travelling down.
fn plan_down(car: &ElevatorCar) -> Option<DirnTarget> {
    let floor = car.current_floor();
    let up = car.up_requests();
    let down = car.down_requests();

    if let Some(target) = down.peek_nearest(floor) {
        return Some(DirnTarget::new(Dirn::Down, target, Dirn::Down));
    }
    if let Some(target) = up.peek_nearest(floor) {
        return Some(DirnTarget::new(Dirn::Up, target, Dirn::Up));
    }
    if let Some(target) = up.first().filter(|f| *f < floor) {
        return Some(DirnTarget::new(Dirn::Down, target, Dirn::Up));
    }
    down.first()
        .filter(|f| *f > floor)
        .map(|target| DirnTarget::new(Dirn::Up, target, Dirn::Down))
}

/// Plan from standstill: nearest stop wins, ties prefer up.
fn plan_idle(car: &ElevatorCar) -> Option<DirnTarget> {
    let floor = car.current_floor();
    let up = car.up_requests();
    let down = car.down_requests();

    let up_near = up.peek_nearest(floor).map(|t| DirnTarget::new(Dirn::Up, t, Dirn::Up));
    let down_near = down.peek_nearest(floor).map(|t| DirnTarget::new(Dirn::Down, t, Dirn::Down));
    if let Some(plan) = closer(floor, up_near, down_near) {
        return Some(plan);
    }

    // Up-calls below the car and down-calls above it
    let stranded_above = down.first().filter(|f| *f > floor).map(|t| DirnTarget::new(Dirn::Up, t, Dirn::Down));
    let stranded_below = up.first().filter(|f| *f < floor).map(|t| DirnTarget::new(Dirn::Down, t, Dirn::Up));
    closer(floor, stranded_above, stranded_below)
}

/// Picks the candidate closer to `floor`; `first` wins ties.
fn closer(floor: Floor, first: Option<DirnTarget>, second: Option<DirnTarget>) -> Option<DirnTarget> {
    match (first, second) {
        (Some(a), Some(b)) => {
            if a.distance(floor) <= b.distance(floor) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (a, b) => a.or(b),
    }
}

/// Whether a fresh plan may replace the target of a car that is already moving.
///
/// A moving car never turns around mid-trip; it only picks up a stop in its travel direction.
pub fn keeps_direction(car: &ElevatorCar, plan: &DirnTarget) -> bool {
    plan.dirn == car.dirn()
}
