//! Timeout tracker and tick counter tests

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll, Wake, Waker};

use uip_task::time::{TickCounter, TickSource, TickWait, sleep_until};
use uip_task::Timeout;

struct CountingWaker(AtomicUsize);

impl Wake for CountingWaker {
    fn wake(self: Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_not_reached_right_after_start() {
    let clock = TickCounter::new(4);
    let timeout = Timeout::start(&clock, 500);
    assert!(!timeout.reached(&clock));
}

#[test]
fn test_reached_exactly_at_duration() {
    let clock = TickCounter::new(4);
    let timeout = Timeout::start(&clock, 500);
    clock.advance_by(499);
    assert!(!timeout.reached(&clock));
    clock.advance();
    assert!(timeout.reached(&clock));
    clock.advance_by(1000);
    assert!(timeout.reached(&clock));
}

#[test]
fn test_reset_rearms_with_same_duration() {
    let clock = TickCounter::new(4);
    let mut timeout = Timeout::start(&clock, 500);
    clock.advance_by(700);
    assert!(timeout.reached(&clock));

    timeout.reset(&clock);
    assert!(!timeout.reached(&clock));
    assert_eq!(timeout.duration(), 500);
    assert_eq!(timeout.start_tick(), 700);

    clock.advance_by(500);
    assert!(timeout.reached(&clock));
}

#[test]
fn test_wraparound_is_handled() {
    // start 100 ticks before the counter rolls over
    let clock = TickCounter::starting_at(u32::MAX - 99, 4);
    let timeout = Timeout::start(&clock, 500);

    clock.advance_by(499);
    assert!(clock.now() < timeout.start_tick(), "counter should have wrapped");
    assert!(!timeout.reached(&clock));

    clock.advance();
    assert!(timeout.reached(&clock));
}

#[test]
fn test_reset_across_wraparound() {
    let mut timeout = Timeout::start_at(u32::MAX - 10, 20);
    assert!(timeout.reached_at(9));
    timeout.reset_at(9);
    assert!(!timeout.reached_at(28));
    assert!(timeout.reached_at(29));
}

#[test]
fn test_independent_timeouts_do_not_share_state() {
    let clock = TickCounter::new(4);
    let mut periodic = Timeout::start(&clock, 500);
    let aging = Timeout::start(&clock, 10_000);

    clock.advance_by(500);
    assert!(periodic.reached(&clock));
    assert!(!aging.reached(&clock));

    periodic.reset(&clock);
    assert_eq!(aging.start_tick(), 0);
    assert_eq!(aging.duration(), 10_000);
}

#[test]
fn test_sleep_until_wakes_on_tick() {
    let clock = TickCounter::new(4);
    let timeout = Timeout::start(&clock, 2);
    let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
    let waker = Waker::from(Arc::clone(&counter));
    let mut cx = Context::from_waker(&waker);

    let mut sleep = sleep_until(&clock, timeout);
    assert_eq!(std::pin::Pin::new(&mut sleep).poll(&mut cx), Poll::Pending);
    assert_eq!(clock.pending_waiters(), 1);

    clock.advance();
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    assert_eq!(std::pin::Pin::new(&mut sleep).poll(&mut cx), Poll::Pending);

    clock.advance();
    assert_eq!(std::pin::Pin::new(&mut sleep).poll(&mut cx), Poll::Ready(()));
}

#[test]
fn test_full_waiter_queue_falls_back_to_polling() {
    let clock = TickCounter::new(1);
    let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
    let waker = Waker::from(Arc::clone(&counter));

    assert!(clock.wake_at_next_tick(&waker));
    assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    // queue is full: woken immediately
    assert!(!clock.wake_at_next_tick(&waker));
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}

#[test]
fn test_repeated_sleeps_park_once_per_tick() {
    let clock = TickCounter::new(4);
    let deadline = Timeout::start(&clock, 10);
    let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
    let waker = Waker::from(Arc::clone(&counter));
    let mut cx = Context::from_waker(&waker);
    let mut wait = TickWait::new();

    for _ in 0..8 {
        let mut sleep = wait.sleep_until(&clock, deadline);
        assert_eq!(std::pin::Pin::new(&mut sleep).poll(&mut cx), Poll::Pending);
    }
    assert_eq!(clock.pending_waiters(), 1);
    assert_eq!(wait.parked_at(), Some(0));

    clock.advance();
    assert_eq!(clock.pending_waiters(), 0);
    let mut sleep = wait.sleep_until(&clock, deadline);
    assert_eq!(std::pin::Pin::new(&mut sleep).poll(&mut cx), Poll::Pending);
    assert_eq!(clock.pending_waiters(), 1);
    assert_eq!(wait.parked_at(), Some(1));
}

#[test]
fn test_full_queue_leaves_sleeper_unparked() {
    let clock = TickCounter::new(1);
    let other = Waker::from(Arc::new(CountingWaker(AtomicUsize::new(0))));
    clock.wake_at_next_tick(&other);

    let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
    let waker = Waker::from(Arc::clone(&counter));
    let mut cx = Context::from_waker(&waker);
    let mut wait = TickWait::new();
    let deadline = Timeout::start(&clock, 10);

    for expected in 1..=2 {
        let mut sleep = wait.sleep_until(&clock, deadline);
        assert_eq!(std::pin::Pin::new(&mut sleep).poll(&mut cx), Poll::Pending);
        // every poll falls back to an immediate wake
        assert_eq!(counter.0.load(Ordering::SeqCst), expected);
        assert_eq!(wait.parked_at(), None);
    }
}
