//! Status indicator
//!
//! A timer callback toggles an indicator at a fixed rate to show the system
//! is alive. The callback touches only the indicator.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::task::timer::TimerHandle;

/// Status LED toggle period
pub const LED_TOGGLE_PERIOD_MS: u32 = 500;

/// Something that can be flipped on and off, typically a GPIO-driven LED
pub trait Indicator {
    fn toggle(&mut self);
}

/// Indicator backed by atomics, for boards without a spare LED and for hosts.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SoftLed {
    on: Arc<AtomicBool>,
    toggles: Arc<AtomicU32>,
}

impl SoftLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }

    pub fn toggle_count(&self) -> u32 {
        self.toggles.load(Ordering::Relaxed)
    }
}

impl Indicator for SoftLed {
    fn toggle(&mut self) {
        self.on.fetch_xor(true, Ordering::Relaxed);
        self.toggles.fetch_add(1, Ordering::Relaxed);
    }
}

/// Timer callback that toggles `indicator` on every expiry.
pub fn led_toggle_timer<I: Indicator + 'static>(mut indicator: I) -> impl FnMut(TimerHandle) + 'static {
    move |_timer| indicator.toggle()
}
