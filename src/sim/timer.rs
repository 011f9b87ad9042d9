//! Generation-tagged one-shot timers
//!
//! The host owns the clock and passes the current time in milliseconds.
//! Each timer carries the round generation it was scheduled for, so a new
//! round can drop everything still pending from the old one.

use serde::{Deserialize, Serialize};

/// Milliseconds on the host clock
pub type Millis = u64;

/// A scheduled one-shot timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer<T> {
    pub due: Millis,
    pub generation: u64,
    pub payload: T,
}

/// Pending timers, kept sorted by due time (ties keep scheduling order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerQueue<T> {
    timers: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self { timers: Vec::new() }
    }

    pub fn schedule(&mut self, due: Millis, generation: u64, payload: T) {
        let at = self.timers.partition_point(|t| t.due <= due);
        self.timers.insert(
            at,
            Timer {
                due,
                generation,
                payload,
            },
        );
    }

    /// Drop every timer scheduled for `generation`, returning how many
    pub fn cancel_generation(&mut self, generation: u64) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.generation != generation);
        before - self.timers.len()
    }

    /// Remove and return all timers due at or before `now`, earliest first
    pub fn take_due(&mut self, now: Millis) -> Vec<Timer<T>> {
        let split = self.timers.partition_point(|t| t.due <= now);
        self.timers.drain(..split).collect()
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<Millis> {
        self.timers.first().map(|t| t.due)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
