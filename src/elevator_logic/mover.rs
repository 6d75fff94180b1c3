//! The clock-driven mover.
//!
//! The car state machine never waits. The mover owns the two timers (travel and door dwell),
//! polls them every [config::MOVER_POLL_PERIOD], and feeds the car its events:
//! - one floor of travel elapsed: [ElevatorCar::on_arrival] with the next floor
//! - dwell elapsed: [ElevatorCar::on_dwell_elapsed]
//!
//! While the simulation is stopped the car keeps accepting requests but does not move.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::config;
use crate::elevator_logic::fsm::{Arrival, ElevatorCar};
use crate::elevator_logic::timer::Timer;
use crate::elevator_logic::{CarHandle, Floor};
use crate::snapshot::ElevatorBehaviour;

/// Shared on/off switch for all movers.
pub type SimulationFlag = Arc<AtomicBool>;

/// Timer state of one mover.
#[derive(Debug, Clone)]
pub struct Mover {
    travel_timer: Timer,
    door_timer: Timer,
}

impl Mover {
    /// Creates a mover with the given travel time per floor and door dwell period.
    pub fn new(travel_time: Duration, door_dwell: Duration) -> Self {
        Self {
            travel_timer: Timer::new(travel_time),
            door_timer: Timer::new(door_dwell),
        }
    }

    /// Advances `car` by whatever the timers allow right now.
    ///
    /// ## Returns
    /// The arrival event raised in this step, if any.
    pub fn step(&mut self, car: &mut ElevatorCar) -> Option<Arrival> {
        match car.behaviour() {
            ElevatorBehaviour::Moving => {
                self.door_timer.stop();
                let next = match car.next_floor() {
                    Some(next) => next,
                    None => {
                        self.travel_timer.stop();
                        return None;
                    }
                };

                // Target is the floor the car is standing on
                if next == car.current_floor() {
                    self.travel_timer.stop();
                    return Some(self.arrive(car, next));
                }

                if self.travel_timer.start_if_idle() {
                    return None;
                }
                if self.travel_timer.expired() {
                    return Some(self.arrive(car, next));
                }
                None
            }
            ElevatorBehaviour::DoorOpen => {
                self.travel_timer.stop();
                if !self.door_timer.start_if_idle() && self.door_timer.expired() {
                    self.door_timer.stop();
                    car.on_dwell_elapsed();
                }
                None
            }
            ElevatorBehaviour::Stopped => {
                self.pause();
                None
            }
        }
    }

    /// Drops both timers. They restart from zero on the next step.
    pub fn pause(&mut self) {
        self.travel_timer.stop();
        self.door_timer.stop();
    }

    fn arrive(&mut self, car: &mut ElevatorCar, floor: Floor) -> Arrival {
        let arrival = car.on_arrival(floor);
        match arrival {
            Arrival::Served(_) => {
                self.travel_timer.stop();
                self.door_timer.start();
            }
            // Next floor starts right away
            Arrival::Passed(_) => self.travel_timer.start(),
            Arrival::Ignored => self.travel_timer.stop(),
        }
        arrival
    }
}


/// Runs the mover for one car until the task is aborted.
///
/// Every poll period the car is stepped under its lock and the new snapshot is published
/// through the [CarHandle].
pub async fn run_mover(handle: CarHandle, running: SimulationFlag, travel_time: Duration, door_dwell: Duration) {
    let mut mover = Mover::new(travel_time, door_dwell);
    loop {
        if running.load(Ordering::SeqCst) {
            handle.update(|car| mover.step(car)).await;
        } else {
            mover.pause();
        }
        sleep(config::MOVER_POLL_PERIOD).await;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElevatorConfig;
    use crate::snapshot::Dirn;
    use tokio::time::advance;

    const TRAVEL: Duration = Duration::from_millis(100);
    const DWELL: Duration = Duration::from_millis(200);

    fn car() -> ElevatorCar {
        ElevatorCar::new(0, &ElevatorConfig::default())
    }

    /// Steps the mover every 10 ms for `total`.
    async fn run_for(mover: &mut Mover, car: &mut ElevatorCar, total: Duration) -> Vec<Arrival> {
        let mut events = Vec::new();
        let tick = Duration::from_millis(10);
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            if let Some(arrival) = mover.step(car) {
                events.push(arrival);
            }
            advance(tick).await;
            elapsed += tick;
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn moves_one_floor_per_travel_period() {
        let mut mover = Mover::new(TRAVEL, DWELL);
        let mut car = car();
        car.add_request(3, Dirn::Up).unwrap();

        let events = run_for(&mut mover, &mut car, Duration::from_millis(150)).await;
        assert_eq!(events, vec![Arrival::Passed(2)]);
        assert_eq!(car.current_floor(), 2);

        let events = run_for(&mut mover, &mut car, Duration::from_millis(100)).await;
        assert_eq!(events, vec![Arrival::Served(3)]);
        assert_eq!(car.behaviour(), ElevatorBehaviour::DoorOpen);
    }

    #[tokio::test(start_paused = true)]
    async fn doors_close_after_dwell() {
        let mut mover = Mover::new(TRAVEL, DWELL);
        let mut car = car();
        car.add_request(1, Dirn::Up).unwrap();

        assert_eq!(mover.step(&mut car), Some(Arrival::Served(1)));
        run_for(&mut mover, &mut car, Duration::from_millis(150)).await;
        assert_eq!(car.behaviour(), ElevatorBehaviour::DoorOpen);

        run_for(&mut mover, &mut car, Duration::from_millis(100)).await;
        assert_eq!(car.behaviour(), ElevatorBehaviour::Stopped);
        assert_eq!(car.dirn(), Dirn::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_car_is_left_alone() {
        let mut mover = Mover::new(TRAVEL, DWELL);
        let mut car = car();
        let events = run_for(&mut mover, &mut car, Duration::from_millis(500)).await;
        assert!(events.is_empty());
        assert_eq!(car.current_floor(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_mover_does_nothing_while_stopped() {
        let handle = CarHandle::new(car());
        let running: SimulationFlag = Arc::new(AtomicBool::new(false));
        handle.update(|car| car.add_request(4, Dirn::Up)).await.unwrap();

        let task = tokio::spawn(run_mover(handle.clone(), running.clone(), TRAVEL, DWELL));
        sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.snapshot().current_floor, 1);

        running.store(true, Ordering::SeqCst);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.snapshot().current_floor, 4);
        task.abort();
    }
}
