//! Network task
//!
//! One iteration ([`NetworkTask::step`]):
//!
//! 1. Try a non-blocking read from the link.
//! 2. If a frame arrived, classify it and dispatch it to the engine.
//! 3. Otherwise, if the periodic timeout is due, sweep every slot and then
//!    check the ARP aging timeout.
//! 4. Otherwise do nothing.
//!
//! Frame work always wins: periodic and aging work wait for an iteration
//! with no inbound frame. The task never terminates.

use alloc::sync::Arc;
use futures_util::future::select;
use log::{debug, info, warn};

use crate::drivers::net::LinkDevice;
use crate::task::semaphore::BinarySemaphore;
use crate::task::{IDLE_PRIORITY, MINIMAL_STACK_SIZE, TaskConfig, yield_now};
use crate::time::{TickSource, TickWait};

use super::config::{ConfigError, NetworkConfig, WakeMode};
use super::context::NetContext;
use super::dispatch::{Output, dispatch_frame};
use super::ethernet::{DisplayMac, FrameKind, classify};
use super::periodic::{ArpAging, PeriodicServicer};
use super::stack::{ArpEngine, ProtocolEngine};
use super::stats::bump;

pub use super::stats::NetStats;

/// Scheduler parameters for the network task
pub const NETWORK_TASK_CONFIG: TaskConfig =
    TaskConfig::new("uIP", MINIMAL_STACK_SIZE * 3, IDLE_PRIORITY + 1);

/// What one iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A frame was read and dispatched
    Frame { kind: FrameKind, replied: bool },
    /// The periodic sweep ran; `aged` if ARP aging ran after it
    Periodic { sent: usize, aged: bool },
    /// No frame and nothing due
    Idle,
}

pub struct NetworkTask<E, A, D, C> {
    ctx: NetContext,
    engine: E,
    arp: A,
    link: D,
    clock: C,
    port: u8,
    periodic: PeriodicServicer,
    aging: ArpAging,
    wake: Arc<BinarySemaphore>,
    wake_mode: WakeMode,
    /// Parking record for the periodic deadline, kept across idle waits
    tick_wait: TickWait,
    stats: NetStats,
}

impl<E, A, D, C> NetworkTask<E, A, D, C>
where
    E: ProtocolEngine,
    A: ArpEngine,
    D: LinkDevice,
    C: TickSource,
{
    /// Bring up the engine and arm both cadences.
    ///
    /// Creates the wake semaphore, starts the periodic and aging timeouts,
    /// initialises the engine, programs the addresses and the port's MAC,
    /// then starts the application layer.
    pub fn new(
        config: &NetworkConfig,
        mut engine: E,
        arp: A,
        link: D,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let wake = Arc::new(BinarySemaphore::new_given());
        let periodic = PeriodicServicer::new(&clock, config.periodic_ticks(), config.udp_enabled);
        let aging = ArpAging::new(&clock, config.arp_ticks());

        let addresses = config.addresses();
        let mac = link.mac_address(config.port);

        engine.init();
        engine.set_host_addr(addresses.host);
        engine.set_router_addr(addresses.router);
        engine.set_netmask(addresses.netmask);
        engine.set_eth_addr(mac);

        info!(
            "net: port {} ({:?}) MAC {} host {} router {} netmask {}",
            config.port,
            link.link_status(config.port),
            DisplayMac(&mac),
            addresses.host,
            addresses.router,
            addresses.netmask
        );

        engine.app_init();

        Ok(Self {
            ctx: NetContext::new(addresses, mac),
            engine,
            arp,
            link,
            clock,
            port: config.port,
            periodic,
            aging,
            wake,
            wake_mode: config.wake_mode,
            tick_wait: TickWait::new(),
            stats: NetStats::default(),
        })
    }

    /// Run one iteration of the loop.
    pub fn step(&mut self) -> Action {
        let Self {
            ctx,
            engine,
            arp,
            link,
            clock,
            port,
            periodic,
            aging,
            stats,
            ..
        } = self;

        let len = read_frame(link, *port, ctx, stats);
        let mut out = Output::new(link, *port, stats);

        if len > 0 {
            bump(&mut out.stats.frames_received);
            let kind = classify(ctx.buffer().frame());
            debug!("RX: {:?} frame, {} bytes", kind, len);
            let replied = dispatch_frame(kind, ctx, engine, arp, &mut out);
            return Action::Frame { kind, replied };
        }

        match periodic.poll(&*clock, ctx, engine, arp, &mut out) {
            Some(sent) => {
                let aged = aging.poll(&*clock, arp);
                if aged {
                    bump(&mut out.stats.arp_agings);
                }
                Action::Periodic { sent, aged }
            }
            None => Action::Idle,
        }
    }

    /// Busy-poll forever, for schedulers that preempt on their own.
    pub fn run_forever(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Task body for the cooperative executor.
    ///
    /// Yields after every iteration. In [`WakeMode::Semaphore`] an idle
    /// iteration instead sleeps until the wake semaphore is given or the
    /// periodic timeout comes due.
    pub async fn run(mut self) {
        info!("net: task running ({:?} mode)", self.wake_mode);
        loop {
            let action = self.step();
            if action == Action::Idle && self.wake_mode == WakeMode::Semaphore {
                self.wait_for_work().await;
            } else {
                yield_now().await;
            }
        }
    }

    async fn wait_for_work(&mut self) {
        let Self {
            wake,
            clock,
            periodic,
            tick_wait,
            ..
        } = self;
        let frame_ready = wake.take();
        let periodic_due = tick_wait.sleep_until(&*clock, *periodic.timeout());
        select(frame_ready, periodic_due).await;
    }

    /// Semaphore an interrupt handler gives when a frame is ready
    pub fn wake_semaphore(&self) -> Arc<BinarySemaphore> {
        Arc::clone(&self.wake)
    }

    pub fn stats(&self) -> &NetStats {
        &self.stats
    }

    pub fn context(&self) -> &NetContext {
        &self.ctx
    }

    pub fn wake_mode(&self) -> WakeMode {
        self.wake_mode
    }
}

/// Read one frame into the context buffer. Failures and impossible lengths
/// count as "no frame".
fn read_frame<D: LinkDevice>(
    link: &mut D,
    port: u8,
    ctx: &mut NetContext,
    stats: &mut NetStats,
) -> usize {
    let buffer = ctx.buffer_mut();
    let len = match link.read(port, buffer.as_mut_slice()) {
        Ok(len) => len,
        Err(e) => {
            warn!("RX: read on port {} failed: {}", port, e);
            bump(&mut stats.rx_errors);
            0
        }
    };
    if buffer.set_len(len).is_err() {
        warn!("RX: port {} reported impossible length {}", port, len);
        bump(&mut stats.rx_errors);
        buffer.clear();
        return 0;
    }
    len
}
