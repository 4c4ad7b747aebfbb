//Ethernet Frame Layer (OSI Layer 2)
//
//Only the header is interpreted here: enough to decide which protocol path
//a received frame takes. Frame structure:
//[Dest MAC (6)][Src MAC (6)][EtherType (2)][Payload (46-1500)]

/// EtherType constants
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;

/// Hardware (MAC) address
pub type MacAddr = [u8; 6];

/// Broadcast MAC address (FF:FF:FF:FF:FF:FF)
pub const BROADCAST_MAC: MacAddr = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

/// Byte offset of the EtherType field
pub const ETHERTYPE_OFFSET: usize = 12;

/// Ethernet frame header size (excluding CRC)
pub const HEADER_SIZE: usize = 14;

/// Maximum Ethernet payload size (MTU)
pub const MAX_PAYLOAD_SIZE: usize = 1500;

/// Largest frame the link layer hands us (header + MTU, CRC stripped)
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// Dispatch path for a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// IPv4 datagram, handled by the protocol engine
    Ipv4,
    /// ARP request or reply, handled by the address-resolution engine
    Arp,
    /// Anything else, dropped
    Unrecognized,
}

/// Read the EtherType of a raw frame, if the frame is long enough to carry one.
pub fn ethertype(frame: &[u8]) -> Option<u16> {
    let bytes = frame.get(ETHERTYPE_OFFSET..HEADER_SIZE)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Decide the dispatch path from the EtherType field alone.
///
/// Frames too short to hold a header are unrecognized.
pub fn classify(frame: &[u8]) -> FrameKind {
    match ethertype(frame) {
        Some(ETHERTYPE_IPV4) => FrameKind::Ipv4,
        Some(ETHERTYPE_ARP) => FrameKind::Arp,
        _ => FrameKind::Unrecognized,
    }
}

/// Check if the frame is addressed to everyone
pub fn is_broadcast(frame: &[u8]) -> bool {
    frame.get(0..6) == Some(&BROADCAST_MAC[..])
}

/// Format a MAC address as `aa:bb:cc:dd:ee:ff`.
pub struct DisplayMac<'a>(pub &'a MacAddr);

impl core::fmt::Display for DisplayMac<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}
