//! Network task counters

/// Counters kept by the network task. They only ever increase, wrapping
/// on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetStats {
    /// Frames read from the link, of any kind
    pub frames_received: u32,
    pub ipv4_frames: u32,
    pub arp_frames: u32,
    /// Frames dropped because their EtherType has no handler
    pub unrecognized_frames: u32,
    /// Link reads that failed; counted as "no frame"
    pub rx_errors: u32,
    /// Frames handed to the link and accepted
    pub frames_sent: u32,
    /// Frames the link refused
    pub tx_errors: u32,
    /// Connection/datagram sweeps
    pub periodic_ticks: u32,
    /// ARP table aging runs
    pub arp_agings: u32,
}

pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}
