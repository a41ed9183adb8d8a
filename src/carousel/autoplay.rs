//! Autoplay countdown.
//!
//! Decremented in whole-second steps by the repeating tick. Pausing only
//! flips a flag the tick consults; it never touches the timer itself.

use std::time::Duration;

/// Granularity of the autoplay tick.
pub const TICK: Duration = Duration::from_secs(1);

const TICK_MS: u64 = 1000;

/// Remaining time until the next automatic advance.
///
/// Invariant: `remaining_ms <= interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayState {
    interval_ms: u64,
    remaining_ms: u64,
    paused: bool,
}

impl AutoplayState {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            remaining_ms: interval_ms,
            paused: false,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Time spent on the current slide, at tick granularity.
    pub fn elapsed_ms(&self) -> u64 {
        self.interval_ms - self.remaining_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Apply one tick. Returns `true` when the countdown ran out; the
    /// countdown is already re-armed in that case.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(TICK_MS);
        if self.remaining_ms == 0 {
            self.remaining_ms = self.interval_ms;
            return true;
        }
        false
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unpause. The countdown restarts from the full interval.
    pub fn resume(&mut self) {
        self.paused = false;
        self.rearm();
    }

    /// Reset the countdown to the full interval.
    pub fn rearm(&mut self) {
        self.remaining_ms = self.interval_ms;
    }
}
