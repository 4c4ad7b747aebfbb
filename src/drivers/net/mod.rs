// Link-layer Device Abstraction
pub mod queue;

use thiserror::Error;

use crate::net::ethernet::MacAddr;

/// link status of a network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Up,
    Down,
    Unknown,
}

/// Errors that can occur during frame transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransmitError {
    /// Frame too large for the device
    #[error("frame too large for the device")]
    PacketTooLarge,
    /// TX buffer is full, try again later
    #[error("transmit buffer full")]
    BufferFull,
    /// Port does not exist or is not ready
    #[error("port {0} not ready")]
    NotReady(u8),
    /// Hardware error during transmission
    #[error("hardware error during transmission")]
    HardwareError,
}

/// Errors that can occur during frame reception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReceiveError {
    /// CRC error in received frame
    #[error("CRC error")]
    CrcError,
    /// Frame does not fit the receive buffer
    #[error("frame too large")]
    PacketTooLarge,
    /// Port does not exist or is not ready
    #[error("port {0} not ready")]
    NotReady(u8),
    /// Hardware error during reception
    #[error("hardware error during reception")]
    HardwareError,
}

/// Link-layer device the network task reads frames from and writes frames to
pub trait LinkDevice {
    /// MAC address of `port`
    fn mac_address(&self, port: u8) -> MacAddr;

    /// Read one frame into `buf` without blocking
    ///
    /// # Returns
    /// * `Ok(0)` if no frame is waiting
    /// * `Ok(len)` with the frame in `buf[..len]`
    fn read(&mut self, port: u8, buf: &mut [u8]) -> Result<usize, ReceiveError>;

    /// Transmit one complete frame on `port`
    fn send(&mut self, port: u8, frame: &[u8]) -> Result<(), TransmitError>;

    /// Get the current link status
    fn link_status(&self, _port: u8) -> LinkStatus {
        LinkStatus::Unknown
    }
}
