//! Cancelable debounce timer.
//!
//! Time is supplied by the caller, which keeps the controller deterministic:
//! hosts call `Controller::poll_timer(Instant::now())` from their event loop,
//! tests pass synthetic instants.

use std::time::{Duration, Instant};

/// A single-slot timer. Arming replaces any pending deadline.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    deadline: Option<Instant>,
    generation: u64,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer to fire `delay` after `now`.
    /// Returns the generation of the new deadline.
    pub fn arm(&mut self, now: Instant, delay: Duration) -> u64 {
        self.generation += 1;
        self.deadline = Some(now + delay);
        self.generation
    }

    /// Invalidate any pending deadline.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has passed. Returns true when fired.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
