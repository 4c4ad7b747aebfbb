//! Deadline tracking against the scheduler tick.

use super::{Tick, TickSource};

/// A start instant plus a duration.
///
/// `reached` is true once `now - start >= duration`, computed with wrapping
/// subtraction so the check stays correct across counter rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    start: Tick,
    duration: Tick,
}

impl Timeout {
    /// Arm a timeout of `duration` ticks starting now.
    pub fn start<C: TickSource + ?Sized>(clock: &C, duration: Tick) -> Self {
        Self::start_at(clock.now(), duration)
    }

    pub const fn start_at(now: Tick, duration: Tick) -> Self {
        Self { start: now, duration }
    }

    pub fn reached<C: TickSource + ?Sized>(&self, clock: &C) -> bool {
        self.reached_at(clock.now())
    }

    pub fn reached_at(&self, now: Tick) -> bool {
        now.wrapping_sub(self.start) >= self.duration
    }

    /// Rebind the start instant to now. The duration is kept.
    ///
    /// Call right after observing `reached() == true`, otherwise the same
    /// tick fires again.
    pub fn reset<C: TickSource + ?Sized>(&mut self, clock: &C) {
        self.reset_at(clock.now());
    }

    pub fn reset_at(&mut self, now: Tick) {
        self.start = now;
    }

    /// Ticks left before the timeout is reached, zero once it has been.
    pub fn remaining_at(&self, now: Tick) -> Tick {
        self.duration.saturating_sub(now.wrapping_sub(self.start))
    }

    pub fn start_tick(&self) -> Tick {
        self.start
    }

    pub fn duration(&self) -> Tick {
        self.duration
    }
}
