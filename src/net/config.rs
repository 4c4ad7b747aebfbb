//! Network task configuration

use core::net::Ipv4Addr;

use log::warn;
use thiserror::Error;

use crate::time::{DEFAULT_TICK_RATE_HZ, Tick, ms_to_ticks};

use super::context::AddressMapping;

pub const DEFAULT_HOST_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 3);
pub const DEFAULT_ROUTER_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const DEFAULT_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Connection/datagram servicing cadence
pub const DEFAULT_PERIODIC_INTERVAL_MS: u32 = 500;

/// ARP table aging cadence
pub const DEFAULT_ARP_INTERVAL_MS: u32 = 10_000;

/// How the network task waits when there is nothing to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WakeMode {
    /// Poll the link every iteration, yielding to the scheduler in between
    #[default]
    Poll,
    /// Sleep on the wake semaphore until a frame-ready signal or the next
    /// periodic deadline, whichever comes first
    Semaphore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("periodic interval must be nonzero")]
    ZeroPeriodicInterval,
    #[error("ARP aging interval must be nonzero")]
    ZeroArpInterval,
    #[error("tick rate must be nonzero")]
    ZeroTickRate,
}

/// Network configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Local IP address
    pub host_addr: Ipv4Addr,
    /// Default router
    pub router_addr: Ipv4Addr,
    /// Subnet mask
    pub netmask: Ipv4Addr,
    /// Link-layer port to read from and write to
    pub port: u8,
    pub periodic_interval_ms: u32,
    pub arp_interval_ms: u32,
    /// Scheduler tick rate used to convert the intervals above
    pub tick_rate_hz: u32,
    /// Sweep datagram slots on each periodic tick
    pub udp_enabled: bool,
    pub wake_mode: WakeMode,
}

impl NetworkConfig {
    pub fn new(host_addr: Ipv4Addr, router_addr: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Self {
            host_addr,
            router_addr,
            netmask,
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u8) -> Self {
        self.port = port;
        self
    }

    pub fn with_intervals(mut self, periodic_ms: u32, arp_ms: u32) -> Self {
        self.periodic_interval_ms = periodic_ms;
        self.arp_interval_ms = arp_ms;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate_hz: u32) -> Self {
        self.tick_rate_hz = tick_rate_hz;
        self
    }

    pub fn with_udp(mut self, enabled: bool) -> Self {
        self.udp_enabled = enabled;
        self
    }

    pub fn with_wake_mode(mut self, mode: WakeMode) -> Self {
        self.wake_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.periodic_interval_ms == 0 {
            return Err(ConfigError::ZeroPeriodicInterval);
        }
        if self.arp_interval_ms == 0 {
            return Err(ConfigError::ZeroArpInterval);
        }
        if self.arp_interval_ms < self.periodic_interval_ms {
            warn!(
                "ARP interval {} ms is shorter than the periodic interval {} ms; aging runs every periodic tick",
                self.arp_interval_ms, self.periodic_interval_ms
            );
        }
        Ok(())
    }

    pub fn addresses(&self) -> AddressMapping {
        AddressMapping::new(self.host_addr, self.router_addr, self.netmask)
    }

    pub fn periodic_ticks(&self) -> Tick {
        ms_to_ticks(self.periodic_interval_ms, self.tick_rate_hz)
    }

    pub fn arp_ticks(&self) -> Tick {
        ms_to_ticks(self.arp_interval_ms, self.tick_rate_hz)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host_addr: DEFAULT_HOST_ADDR,
            router_addr: DEFAULT_ROUTER_ADDR,
            netmask: DEFAULT_NETMASK,
            port: 0,
            periodic_interval_ms: DEFAULT_PERIODIC_INTERVAL_MS,
            arp_interval_ms: DEFAULT_ARP_INTERVAL_MS,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            udp_enabled: true,
            wake_mode: WakeMode::Poll,
        }
    }
}
