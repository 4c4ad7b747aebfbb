//! Session context shared with the protocol engine.
//!
//! Owns the frame buffer, the output-length signal (the buffer length) and
//! the interface addresses. The engine gets `&mut NetContext` for the
//! duration of one call and keeps nothing past it.

use core::net::Ipv4Addr;

use super::buffer::FrameBuffer;
use super::ethernet::MacAddr;

/// Interface addresses, fixed once the network task has started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMapping {
    pub host: Ipv4Addr,
    pub router: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl AddressMapping {
    pub const fn new(host: Ipv4Addr, router: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Self { host, router, netmask }
    }
}

pub struct NetContext {
    buffer: FrameBuffer,
    addresses: AddressMapping,
    mac: MacAddr,
}

impl NetContext {
    pub fn new(addresses: AddressMapping, mac: MacAddr) -> Self {
        Self {
            buffer: FrameBuffer::new(),
            addresses,
            mac,
        }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    /// Current output length; nonzero asks for a transmit
    pub fn output_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn has_output(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn addresses(&self) -> &AddressMapping {
        &self.addresses
    }

    pub fn mac(&self) -> MacAddr {
        self.mac
    }
}
