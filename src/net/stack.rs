//! Protocol engine interface
//!
//! The TCP/IP engine and its ARP sub-engine are external. They operate on
//! the [`NetContext`] they are handed and report work to transmit by
//! leaving a nonzero length in its buffer. None of these calls can fail
//! from the network task's point of view.

use core::net::Ipv4Addr;

use super::context::NetContext;
use super::ethernet::MacAddr;

/// The TCP/IP protocol engine.
pub trait ProtocolEngine {
    /// Reset all engine state. Called once, before any address setter.
    fn init(&mut self);

    fn set_host_addr(&mut self, addr: Ipv4Addr);
    fn set_router_addr(&mut self, addr: Ipv4Addr);
    fn set_netmask(&mut self, addr: Ipv4Addr);
    fn set_eth_addr(&mut self, mac: MacAddr);

    /// Start the application layer (e.g. an HTTP server) once addresses
    /// are configured.
    fn app_init(&mut self) {}

    /// Size of the connection slot table
    fn connection_slots(&self) -> usize;

    /// Size of the datagram slot table
    fn datagram_slots(&self) -> usize {
        0
    }

    /// Process the inbound IPv4 frame held in the context buffer.
    fn input(&mut self, ctx: &mut NetContext);

    /// Periodic service for one connection slot (retransmits, timers).
    fn periodic(&mut self, slot: usize, ctx: &mut NetContext);

    /// Periodic service for one datagram slot.
    fn udp_periodic(&mut self, _slot: usize, _ctx: &mut NetContext) {}
}

/// The address-resolution sub-engine.
pub trait ArpEngine {
    /// Learn from the link header of an inbound IPv4 frame.
    fn ip_in(&mut self, ctx: &mut NetContext);

    /// Handle an inbound ARP frame, possibly leaving a reply in the buffer.
    fn arp_in(&mut self, ctx: &mut NetContext);

    /// Prepend link-layer addressing to outbound IPv4 data, or replace it
    /// with an ARP request when the next hop is unresolved.
    fn arp_out(&mut self, ctx: &mut NetContext);

    /// Age the address table, purging stale entries.
    fn timer(&mut self);
}

/// Log hook for protocol engines.
pub fn stack_log(message: &str) {
    log::info!(target: "uip", "{}", message);
}
