//! Scheduler ticks
//!
//! A free-running 32-bit tick counter advanced from the timer interrupt.
//! Every comparison against it goes through wrapping subtraction, so the
//! counter may roll over without disturbing any deadline in flight.

pub mod timeout;

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicU32, Ordering};
use core::task::{Context, Poll, Waker};

use alloc::sync::Arc;
use crossbeam_queue::ArrayQueue;
use lazy_static::lazy_static;

use self::timeout::Timeout;

/// Scheduler tick count. Wraps at `u32::MAX`.
pub type Tick = u32;

/// Default scheduler tick rate (1 tick per millisecond)
pub const DEFAULT_TICK_RATE_HZ: u32 = 1000;

/// Number of sleepers the system tick counter can hold between two ticks
pub const TICK_WAITER_CAPACITY: usize = 32;

/// Source of the current tick count.
pub trait TickSource {
    /// Current tick count
    fn now(&self) -> Tick;

    /// Arrange for `waker` to be woken on the next tick.
    ///
    /// Returns `true` if the waker is queued for the next tick and `false`
    /// if it was woken right away. Sources that cannot notify wake
    /// immediately, which turns any sleep into a yield-and-recheck loop.
    fn wake_at_next_tick(&self, waker: &Waker) -> bool {
        waker.wake_by_ref();
        false
    }
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn now(&self) -> Tick {
        (**self).now()
    }

    fn wake_at_next_tick(&self, waker: &Waker) -> bool {
        (**self).wake_at_next_tick(waker)
    }
}

impl<T: TickSource + ?Sized> TickSource for Arc<T> {
    fn now(&self) -> Tick {
        (**self).now()
    }

    fn wake_at_next_tick(&self, waker: &Waker) -> bool {
        (**self).wake_at_next_tick(waker)
    }
}

/// Atomic tick counter with a queue of sleepers to wake on each tick.
pub struct TickCounter {
    count: AtomicU32,
    waiters: ArrayQueue<Waker>,
}

impl TickCounter {
    pub fn new(waiter_capacity: usize) -> Self {
        Self::starting_at(0, waiter_capacity)
    }

    /// Counter whose first reading is `tick`. Used to exercise rollover.
    pub fn starting_at(tick: Tick, waiter_capacity: usize) -> Self {
        Self {
            count: AtomicU32::new(tick),
            waiters: ArrayQueue::new(waiter_capacity.max(1)),
        }
    }

    /// Advance by one tick and wake everything sleeping on it.
    ///
    /// Safe to call from interrupt context: no locks are taken.
    pub fn advance(&self) -> Tick {
        let now = self.count.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        while let Some(waker) = self.waiters.pop() {
            waker.wake();
        }
        now
    }

    pub fn advance_by(&self, ticks: Tick) -> Tick {
        let mut now = self.now();
        for _ in 0..ticks {
            now = self.advance();
        }
        now
    }

    /// Number of sleepers currently parked on the next tick
    pub fn pending_waiters(&self) -> usize {
        self.waiters.len()
    }
}

impl TickSource for TickCounter {
    fn now(&self) -> Tick {
        self.count.load(Ordering::Acquire)
    }

    fn wake_at_next_tick(&self, waker: &Waker) -> bool {
        if self.waiters.push(waker.clone()).is_err() {
            // queue full: fall back to polling
            waker.wake_by_ref();
            return false;
        }
        true
    }
}

lazy_static! {
    /// System tick counter, advanced by [`crate::interrupts::timer_tick`].
    pub static ref SYSTEM_TICKS: TickCounter = TickCounter::new(TICK_WAITER_CAPACITY);
}

/// Convert milliseconds to ticks at `tick_rate_hz`.
///
/// A nonzero interval never rounds down to zero ticks.
pub fn ms_to_ticks(ms: u32, tick_rate_hz: u32) -> Tick {
    let ticks = (ms as u64 * tick_rate_hz as u64) / 1000;
    if ms > 0 && ticks == 0 {
        return 1;
    }
    ticks.min(Tick::MAX as u64) as Tick
}

/// Where a sleeper last parked its waker on a tick source.
///
/// A waker parked during tick `t` stays queued until the counter leaves
/// `t`. Long-lived sleepers keep one of these across sleeps so that being
/// polled again within the same tick, even through a fresh [`SleepUntil`],
/// does not queue another copy of the same waker.
#[derive(Debug, Default)]
pub struct TickWait {
    parked: Option<(Tick, Waker)>,
}

impl TickWait {
    pub const fn new() -> Self {
        Self { parked: None }
    }

    /// Sleep until `timeout` is reached, recording the parking here.
    pub fn sleep_until<'a, C: TickSource + ?Sized>(
        &'a mut self,
        clock: &'a C,
        timeout: Timeout,
    ) -> SleepUntil<'a, C> {
        SleepUntil {
            clock,
            timeout,
            wait: Slot::Shared(self),
        }
    }

    /// Tick during which the waker was last queued, if it still may be
    pub fn parked_at(&self) -> Option<Tick> {
        self.parked.as_ref().map(|(tick, _)| *tick)
    }

    fn park<C: TickSource + ?Sized>(&mut self, clock: &C, waker: &Waker) {
        // read before parking: a tick in between costs one extra entry at most
        let now = clock.now();
        if let Some((tick, parked)) = &self.parked {
            if *tick == now && parked.will_wake(waker) {
                return;
            }
        }
        self.parked = if clock.wake_at_next_tick(waker) {
            Some((now, waker.clone()))
        } else {
            None
        };
    }
}

enum Slot<'a> {
    Own(TickWait),
    Shared(&'a mut TickWait),
}

impl Slot<'_> {
    fn get(&mut self) -> &mut TickWait {
        match self {
            Slot::Own(wait) => wait,
            Slot::Shared(wait) => &mut **wait,
        }
    }
}

/// Future that completes once `timeout` has been reached on `clock`.
pub struct SleepUntil<'a, C: TickSource + ?Sized> {
    clock: &'a C,
    timeout: Timeout,
    wait: Slot<'a>,
}

/// Sleep until `timeout` is reached.
///
/// For one-off sleeps. Loops that sleep repeatedly use
/// [`TickWait::sleep_until`].
pub fn sleep_until<C: TickSource + ?Sized>(clock: &C, timeout: Timeout) -> SleepUntil<'_, C> {
    SleepUntil {
        clock,
        timeout,
        wait: Slot::Own(TickWait::new()),
    }
}

impl<C: TickSource + ?Sized> Future for SleepUntil<'_, C> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.timeout.reached_at(this.clock.now()) {
            return Poll::Ready(());
        }
        // register before the second check so a tick in between is not lost
        this.wait.get().park(this.clock, cx.waker());
        if this.timeout.reached_at(this.clock.now()) {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
