//! Interrupt-side entry points
//!
//! The board's vector table stays outside this crate. Its handlers call in
//! here: the tick handler advances [`SYSTEM_TICKS`] and the link handler
//! gives the network task's wake semaphore.

use alloc::sync::Arc;
use conquer_once::spin::OnceCell;
use spin::Mutex as SpinMutex;

use crate::task::semaphore::BinarySemaphore;
use crate::time::{SYSTEM_TICKS, Tick};

/// Number of IRQ lines in the handler table
pub const IRQ_LINES: usize = 16;

/// IRQ line of the scheduler tick
pub const TIMER_IRQ: u8 = 0;

static IRQ_HANDLERS: SpinMutex<[Option<fn()>; IRQ_LINES]> = SpinMutex::new([None; IRQ_LINES]);

/// Semaphore given by [`frame_ready_irq`]
static FRAME_READY: OnceCell<Arc<BinarySemaphore>> = OnceCell::uninit();

// register a simple handler for a given irq number (0-15)
pub fn register_irq_handler(irq: u8, handler: fn()) -> bool {
    let idx = irq as usize;
    if idx < IRQ_LINES {
        IRQ_HANDLERS.lock()[idx] = Some(handler);
        true
    } else {
        false
    }
}

pub fn unregister_irq_handler(irq: u8) {
    let idx = irq as usize;
    if idx < IRQ_LINES {
        IRQ_HANDLERS.lock()[idx] = None;
    }
}

/// Called from the board's IRQ entry points
pub fn handle_registered_irq(irq: u8) {
    let idx = irq as usize;
    if idx < IRQ_LINES {
        // copy out so the handler runs without the table locked
        let handler = IRQ_HANDLERS.lock()[idx];
        if let Some(h) = handler {
            h();
        }
    }
}

/// Scheduler tick: advance the system tick count, then run the handler
/// registered on [`TIMER_IRQ`].
pub fn timer_tick() -> Tick {
    let now = SYSTEM_TICKS.advance();
    handle_registered_irq(TIMER_IRQ);
    now
}

/// Make `semaphore` the one [`frame_ready_irq`] gives.
///
/// Only the first binding sticks; returns `false` if one already exists.
pub fn bind_frame_ready(semaphore: Arc<BinarySemaphore>) -> bool {
    FRAME_READY.try_init_once(|| semaphore).is_ok()
}

/// Link-layer "frame received" handler. Register it on the NIC's IRQ line.
pub fn frame_ready_irq() {
    if let Ok(semaphore) = FRAME_READY.try_get() {
        semaphore.give();
    }
}
