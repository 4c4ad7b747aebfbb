//! Software timers
//!
//! A fixed-size table of named timers serviced by one task. Each timer has
//! a period in ticks and either reloads itself on expiry or goes dormant
//! until started again. Callbacks run on the timer task, never in
//! interrupt context.

use alloc::boxed::Box;
use alloc::vec::Vec;
use log::{debug, info};
use thiserror::Error;

use crate::time::{Tick, TickSource, TickWait, timeout::Timeout};

/// Index of a timer inside its [`TimerService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerHandle(usize);

/// Errors from timer creation and control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer table is full")]
    TableFull,
    #[error("unknown timer {0:?}")]
    UnknownTimer(TimerHandle),
    #[error("timer period must be at least one tick")]
    ZeroPeriod,
}

pub type TimerCallback = Box<dyn FnMut(TimerHandle)>;

struct SoftwareTimer {
    name: &'static str,
    period: Tick,
    auto_reload: bool,
    callback: TimerCallback,
    /// `None` while dormant
    armed: Option<Timeout>,
}

pub struct TimerService<C: TickSource> {
    clock: C,
    timers: Vec<SoftwareTimer>,
    capacity: usize,
    tick_wait: TickWait,
}

impl<C: TickSource> TimerService<C> {
    pub fn new(clock: C, capacity: usize) -> Self {
        Self {
            clock,
            timers: Vec::with_capacity(capacity),
            capacity,
            tick_wait: TickWait::new(),
        }
    }

    /// Create a dormant timer. It does nothing until [`start`](Self::start).
    pub fn create(
        &mut self,
        name: &'static str,
        period: Tick,
        auto_reload: bool,
        callback: impl FnMut(TimerHandle) + 'static,
    ) -> Result<TimerHandle, TimerError> {
        if period == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        if self.timers.len() >= self.capacity {
            return Err(TimerError::TableFull);
        }
        let handle = TimerHandle(self.timers.len());
        self.timers.push(SoftwareTimer {
            name,
            period,
            auto_reload,
            callback: Box::new(callback),
            armed: None,
        });
        info!(
            "timer '{}' created (period {} ticks, auto-reload {})",
            name, period, auto_reload
        );
        Ok(handle)
    }

    /// Arm the timer one period from now. Restarts a running timer.
    pub fn start(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        let now = self.clock.now();
        let timer = self.timer_mut(handle)?;
        timer.armed = Some(Timeout::start_at(now, timer.period));
        debug!("timer '{}' started at tick {}", timer.name, now);
        Ok(())
    }

    pub fn stop(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        self.timer_mut(handle)?.armed = None;
        Ok(())
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers
            .get(handle.0)
            .is_some_and(|timer| timer.armed.is_some())
    }

    /// Fire every expired timer once. Returns how many fired.
    pub fn process(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        for (index, timer) in self.timers.iter_mut().enumerate() {
            let Some(timeout) = timer.armed else {
                continue;
            };
            if !timeout.reached_at(now) {
                continue;
            }

            if timer.auto_reload {
                // re-arm from the expiry instant so the period does not drift
                let expiry = timeout.start_tick().wrapping_add(timeout.duration());
                let mut next = Timeout::start_at(expiry, timer.period);
                if next.reached_at(now) {
                    // fell more than a period behind: skip the missed firings
                    next.reset_at(now);
                }
                timer.armed = Some(next);
            } else {
                timer.armed = None;
            }

            (timer.callback)(TimerHandle(index));
            fired += 1;
        }
        fired
    }

    /// The armed timer closest to expiry.
    pub fn next_expiry(&self) -> Option<Timeout> {
        let now = self.clock.now();
        self.timers
            .iter()
            .filter_map(|timer| timer.armed)
            .min_by_key(|timeout| timeout.remaining_at(now))
    }

    /// Timer service loop: fire due timers, then sleep until the next one.
    pub async fn run(mut self) {
        loop {
            self.process();
            let wait = self
                .next_expiry()
                .unwrap_or_else(|| Timeout::start(&self.clock, 1));
            self.tick_wait.sleep_until(&self.clock, wait).await;
        }
    }

    fn timer_mut(&mut self, handle: TimerHandle) -> Result<&mut SoftwareTimer, TimerError> {
        self.timers
            .get_mut(handle.0)
            .ok_or(TimerError::UnknownTimer(handle))
    }
}
