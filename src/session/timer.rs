//! Per-question countdown driven by cooperative ticks.
//!
//! The countdown does not own a clock. Every tick hands in the current instant,
//! and the wall time elapsed since the previous tick is subtracted from the budget.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Countdown {
    budget: Duration,
    remaining: f64,
    last_tick: Instant,
}

impl Countdown {
    pub fn new(budget: Duration, now: Instant) -> Self {
        Self {
            budget,
            remaining: budget.as_secs_f64(),
            last_tick: now,
        }
    }

    /// Restart with the full budget
    pub fn reset(&mut self, now: Instant) {
        self.remaining = self.budget.as_secs_f64();
        self.last_tick = now;
    }

    /// Move the reference point without spending time (paused ticks)
    pub fn touch(&mut self, now: Instant) {
        self.last_tick = now;
    }

    /// Spend the time elapsed since the last tick; returns remaining seconds
    pub fn advance(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_tick).as_secs_f64();
        self.remaining = (self.remaining - elapsed).max(0.0);
        self.last_tick = now;
        self.remaining
    }

    /// Remaining time in seconds, unrounded
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Remaining time as shown to the player: whole seconds, rounded up
    pub fn display_seconds(&self) -> u32 {
        self.remaining.ceil() as u32
    }
}
