//! Cooperative network task for a minimal TCP/IP stack.
//!
//! The crate drives an external protocol engine from a single polling task:
//! read a frame, classify it, hand it to the engine, transmit whatever the
//! engine produced, and run the connection and ARP housekeeping cadences
//! when the link is quiet. Scheduler primitives (tasks, software timers, a
//! binary semaphore) live in [`task`]; tick accounting lives in [`time`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app;
pub mod interrupts;
pub mod status;
pub mod task;
pub mod time;

// Networking core
pub mod net;

// Link-layer drivers
pub mod drivers;

pub use app::{AppConfig, AppError, Running};
pub use net::config::{NetworkConfig, WakeMode};
pub use net::task::{Action, NetStats, NetworkTask};
pub use time::{Tick, TickCounter, TickSource, timeout::Timeout};
