//! Network task and the interface it drives the protocol engine through

pub mod buffer;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod ethernet;
pub mod periodic;
pub mod stack;
pub mod stats;
pub mod task;
