//! Stack invocation
//!
//! Hands a classified frame to the right engine entry points and transmits
//! whatever the engine leaves in the buffer. A nonzero output length
//! produces exactly one transmit; a zero length produces none.

use log::{debug, warn};

use crate::drivers::net::LinkDevice;

use super::context::NetContext;
use super::ethernet::{FrameKind, ethertype, is_broadcast};
use super::stack::{ArpEngine, ProtocolEngine};
use super::stats::{NetStats, bump};

/// Transmit path: one port of a link device plus the counters to update.
pub struct Output<'a, D: LinkDevice> {
    pub device: &'a mut D,
    pub port: u8,
    pub stats: &'a mut NetStats,
}

impl<'a, D: LinkDevice> Output<'a, D> {
    pub fn new(device: &'a mut D, port: u8, stats: &'a mut NetStats) -> Self {
        Self { device, port, stats }
    }

    /// Send the buffer if it holds output, then clear the output length.
    ///
    /// Returns whether the link was asked to send.
    pub fn transmit(&mut self, ctx: &mut NetContext) -> bool {
        if !ctx.has_output() {
            return false;
        }
        match self.device.send(self.port, ctx.buffer().frame()) {
            Ok(()) => bump(&mut self.stats.frames_sent),
            Err(e) => {
                warn!("TX: {} byte frame refused on port {}: {}", ctx.output_len(), self.port, e);
                bump(&mut self.stats.tx_errors);
            }
        }
        ctx.buffer_mut().clear();
        true
    }
}

/// Run a received frame through the engine.
///
/// Returns whether a reply was transmitted.
pub fn dispatch_frame<E, A, D>(
    kind: FrameKind,
    ctx: &mut NetContext,
    engine: &mut E,
    arp: &mut A,
    out: &mut Output<'_, D>,
) -> bool
where
    E: ProtocolEngine,
    A: ArpEngine,
    D: LinkDevice,
{
    match kind {
        FrameKind::Ipv4 => {
            bump(&mut out.stats.ipv4_frames);
            arp.ip_in(ctx);
            engine.input(ctx);
            if !ctx.has_output() {
                return false;
            }
            arp.arp_out(ctx);
            out.transmit(ctx)
        }
        FrameKind::Arp => {
            bump(&mut out.stats.arp_frames);
            arp.arp_in(ctx);
            // ARP replies come back already addressed
            out.transmit(ctx)
        }
        FrameKind::Unrecognized => {
            bump(&mut out.stats.unrecognized_frames);
            let frame = ctx.buffer().frame();
            debug!(
                "RX: dropping {} frame with EtherType {:04x?}, {} bytes",
                if is_broadcast(frame) { "broadcast" } else { "unicast" },
                ethertype(frame),
                frame.len()
            );
            ctx.buffer_mut().clear();
            false
        }
    }
}
