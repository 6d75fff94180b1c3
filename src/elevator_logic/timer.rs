//! Polled deadlines on the tokio clock.
//!
//! The mover checks its timers once per poll period instead of awaiting them, so a [Timer]
//! is just an optional deadline. Reading it never blocks.

use tokio::time::{Duration, Instant};

/// One-shot deadline `period` after the last start.
#[derive(Debug, Clone)]
pub struct Timer {
    period: Duration,
    deadline: Option<Instant>,
}

impl Timer {
    /// An unarmed timer.
    pub fn new(period: Duration) -> Self {
        Self { period, deadline: None }
    }

    /// Arms the timer from now, restarting it if it was already running.
    pub fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.period);
    }

    /// Arms the timer unless it is already running. Returns `true` if it was armed now.
    pub fn start_if_idle(&mut self) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.start();
        true
    }

    /// Disarms the timer.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// `true` while armed.
    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// `true` once an armed timer is past its deadline.
    pub fn expired(&self) -> bool {
        matches!(self.deadline, Some(deadline) if Instant::now() > deadline)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn expires_only_while_armed() {
        let mut timer = Timer::new(Duration::from_millis(100));
        advance(Duration::from_millis(500)).await;
        assert!(!timer.expired());

        timer.start();
        advance(Duration::from_millis(100)).await;
        assert!(!timer.expired());
        advance(Duration::from_millis(10)).await;
        assert!(timer.expired());

        timer.stop();
        assert!(!timer.expired());
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_moves_the_deadline() {
        let mut timer = Timer::new(Duration::from_millis(100));
        timer.start();
        advance(Duration::from_millis(90)).await;
        timer.start();
        advance(Duration::from_millis(90)).await;
        assert!(!timer.expired());
    }

    #[tokio::test(start_paused = true)]
    async fn start_if_idle_keeps_a_running_deadline() {
        let mut timer = Timer::new(Duration::from_millis(100));
        assert!(timer.start_if_idle());
        advance(Duration::from_millis(90)).await;
        assert!(!timer.start_if_idle());
        advance(Duration::from_millis(20)).await;
        assert!(timer.expired());
    }
}
