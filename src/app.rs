//! Composition root
//!
//! Wires the network task and the status LED timer onto an executor. The
//! board calls [`start`] once with its engine, link device, tick source
//! and indicator, then hands control to [`Executor::run`].

use alloc::sync::Arc;
use log::{info, warn};
use thiserror::Error;

use crate::drivers::net::LinkDevice;
use crate::interrupts;
use crate::net::config::{ConfigError, NetworkConfig};
use crate::net::stack::{ArpEngine, ProtocolEngine};
use crate::net::task::{NETWORK_TASK_CONFIG, NetworkTask};
use crate::status::{Indicator, LED_TOGGLE_PERIOD_MS, led_toggle_timer};
use crate::task::executor::{Executor, SpawnError};
use crate::task::semaphore::BinarySemaphore;
use crate::task::timer::{TimerError, TimerHandle, TimerService};
use crate::task::{IDLE_PRIORITY, MINIMAL_STACK_SIZE, Task, TaskConfig, TaskId};
use crate::time::{TickSource, ms_to_ticks};

/// Scheduler parameters for the software timer task
pub const TIMER_TASK_CONFIG: TaskConfig =
    TaskConfig::new("Tmr Svc", MINIMAL_STACK_SIZE * 2, IDLE_PRIORITY + 2);

/// Software timers available to the application
pub const TIMER_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub network: NetworkConfig,
    /// Status LED toggle period
    pub led_period_ms: u32,
    pub network_task: TaskConfig,
    pub timer_task: TaskConfig,
    pub timer_capacity: usize,
    /// IRQ line that signals "frame received", if the link has one
    pub frame_ready_irq: Option<u8>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            led_period_ms: LED_TOGGLE_PERIOD_MS,
            network_task: NETWORK_TASK_CONFIG,
            timer_task: TIMER_TASK_CONFIG,
            timer_capacity: TIMER_CAPACITY,
            frame_ready_irq: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("network configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("status timer: {0}")]
    Timer(#[from] TimerError),
    #[error("task spawn: {0}")]
    Spawn(#[from] SpawnError),
}

/// Handles to what [`start`] created
pub struct Running {
    pub network_task: TaskId,
    pub timer_task: TaskId,
    pub led_timer: TimerHandle,
    /// The network task's wake semaphore
    pub wake: Arc<BinarySemaphore>,
}

/// Create the network task and the status LED timer and spawn both.
pub fn start<E, A, D, C, I>(
    executor: &mut Executor,
    config: &AppConfig,
    engine: E,
    arp: A,
    link: D,
    clock: C,
    indicator: I,
) -> Result<Running, AppError>
where
    E: ProtocolEngine + 'static,
    A: ArpEngine + 'static,
    D: LinkDevice + 'static,
    C: TickSource + Clone + 'static,
    I: Indicator + 'static,
{
    let network = NetworkTask::new(&config.network, engine, arp, link, clock.clone())?;
    let wake = network.wake_semaphore();

    let mut timers = TimerService::new(clock, config.timer_capacity);
    let led_period = ms_to_ticks(config.led_period_ms, config.network.tick_rate_hz);
    let led_timer = timers.create("LED", led_period, true, led_toggle_timer(indicator))?;
    timers.start(led_timer)?;

    if let Some(irq) = config.frame_ready_irq {
        if !interrupts::bind_frame_ready(Arc::clone(&wake)) {
            warn!("frame-ready IRQ already bound; IRQ {} not wired", irq);
        } else if !interrupts::register_irq_handler(irq, interrupts::frame_ready_irq) {
            warn!("IRQ {} out of range; frame-ready signal not wired", irq);
        }
    }

    let network_task = executor.spawn(Task::with_config(config.network_task, network.run()))?;
    let timer_task = executor.spawn(Task::with_config(config.timer_task, timers.run()))?;
    info!("app: network task and status timer started");

    Ok(Running {
        network_task,
        timer_task,
        led_timer,
        wake,
    })
}
