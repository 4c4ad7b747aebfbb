//! Binary semaphore
//!
//! One token, either available or not. `give` is lock-free and may be
//! called from an interrupt handler; tasks wait with `take().await`.

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};
use futures_util::task::AtomicWaker;

pub struct BinarySemaphore {
    available: AtomicBool,
    waker: AtomicWaker,
}

impl BinarySemaphore {
    /// Create an empty semaphore; the first `take` waits for a `give`.
    pub const fn new() -> Self {
        Self {
            available: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        }
    }

    /// Create a semaphore that already holds its token.
    pub const fn new_given() -> Self {
        Self {
            available: AtomicBool::new(true),
            waker: AtomicWaker::new(),
        }
    }

    /// Make the token available and wake the waiting task.
    ///
    /// Returns `false` if the token was already available.
    pub fn give(&self) -> bool {
        let was_available = self.available.swap(true, Ordering::AcqRel);
        self.waker.wake();
        !was_available
    }

    /// Take the token without waiting.
    pub fn try_take(&self) -> bool {
        self.available
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Wait for the token.
    pub fn take(&self) -> Take<'_> {
        Take { semaphore: self }
    }
}

impl Default for BinarySemaphore {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`BinarySemaphore::take`].
pub struct Take<'a> {
    semaphore: &'a BinarySemaphore,
}

impl Future for Take<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        // fast path
        if self.semaphore.try_take() {
            return Poll::Ready(());
        }

        self.semaphore.waker.register(cx.waker());
        if self.semaphore.try_take() {
            self.semaphore.waker.take();
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
