//! Housekeeping cadences
//!
//! Two independent timeouts: the periodic tick sweeps every connection and
//! datagram slot through the engine, and the slower aging tick purges the
//! ARP table. Aging is only checked from inside a periodic tick.

use log::trace;

use crate::drivers::net::LinkDevice;
use crate::time::{Tick, TickSource, timeout::Timeout};

use super::context::NetContext;
use super::dispatch::Output;
use super::stack::{ArpEngine, ProtocolEngine};
use super::stats::bump;

/// Connection/datagram servicing on a fixed cadence
pub struct PeriodicServicer {
    timeout: Timeout,
    udp_enabled: bool,
}

impl PeriodicServicer {
    pub fn new<C: TickSource + ?Sized>(clock: &C, interval: Tick, udp_enabled: bool) -> Self {
        Self {
            timeout: Timeout::start(clock, interval),
            udp_enabled,
        }
    }

    /// Run a sweep if the periodic timeout has been reached.
    ///
    /// Returns the number of frames transmitted, or `None` if the tick was
    /// not due.
    pub fn poll<C, E, A, D>(
        &mut self,
        clock: &C,
        ctx: &mut NetContext,
        engine: &mut E,
        arp: &mut A,
        out: &mut Output<'_, D>,
    ) -> Option<usize>
    where
        C: TickSource + ?Sized,
        E: ProtocolEngine,
        A: ArpEngine,
        D: LinkDevice,
    {
        if !self.timeout.reached(clock) {
            return None;
        }
        // reset first: a slow sweep must not stretch the cadence
        self.timeout.reset(clock);
        bump(&mut out.stats.periodic_ticks);
        Some(self.sweep(ctx, engine, arp, out))
    }

    /// Service every connection slot, then every datagram slot, in
    /// ascending order.
    pub fn sweep<E, A, D>(
        &self,
        ctx: &mut NetContext,
        engine: &mut E,
        arp: &mut A,
        out: &mut Output<'_, D>,
    ) -> usize
    where
        E: ProtocolEngine,
        A: ArpEngine,
        D: LinkDevice,
    {
        let mut sent = 0;

        let connections = engine.connection_slots();
        for slot in 0..connections {
            ctx.buffer_mut().clear();
            engine.periodic(slot, ctx);
            if flush(ctx, arp, out) {
                sent += 1;
            }
        }

        let datagrams = if self.udp_enabled {
            engine.datagram_slots()
        } else {
            0
        };
        for slot in 0..datagrams {
            ctx.buffer_mut().clear();
            engine.udp_periodic(slot, ctx);
            if flush(ctx, arp, out) {
                sent += 1;
            }
        }

        trace!(
            "periodic: {} connection slots, {} datagram slots, {} frames sent",
            connections, datagrams, sent
        );
        sent
    }

    pub fn timeout(&self) -> &Timeout {
        &self.timeout
    }

    pub fn udp_enabled(&self) -> bool {
        self.udp_enabled
    }
}

fn flush<A: ArpEngine, D: LinkDevice>(
    ctx: &mut NetContext,
    arp: &mut A,
    out: &mut Output<'_, D>,
) -> bool {
    if !ctx.has_output() {
        return false;
    }
    arp.arp_out(ctx);
    out.transmit(ctx)
}

/// ARP table aging on its own, longer cadence
pub struct ArpAging {
    timeout: Timeout,
}

impl ArpAging {
    pub fn new<C: TickSource + ?Sized>(clock: &C, interval: Tick) -> Self {
        Self {
            timeout: Timeout::start(clock, interval),
        }
    }

    /// Age the ARP table if the aging timeout has been reached.
    pub fn poll<C: TickSource + ?Sized, A: ArpEngine>(&mut self, clock: &C, arp: &mut A) -> bool {
        if !self.timeout.reached(clock) {
            return false;
        }
        self.timeout.reset(clock);
        trace!("periodic: aging ARP table");
        arp.timer();
        true
    }

    pub fn timeout(&self) -> &Timeout {
        &self.timeout
    }
}
