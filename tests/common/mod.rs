//! Collaborator doubles shared by the integration tests.
//!
//! Every double appends to one shared call log, so tests can assert the
//! relative order of engine, ARP and link calls.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::net::Ipv4Addr;
use std::rc::Rc;
use std::sync::Arc;

use uip_task::drivers::net::{LinkDevice, ReceiveError, TransmitError};
use uip_task::net::context::NetContext;
use uip_task::net::ethernet::{ETHERTYPE_ARP, ETHERTYPE_IPV4, HEADER_SIZE, MacAddr};
use uip_task::net::stack::{ArpEngine, ProtocolEngine};
use uip_task::{NetworkConfig, NetworkTask, TickCounter};

pub const TEST_MAC: MacAddr = [0x3a, 0x1f, 0x34, 0x08, 0x54, 0x05];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    SetHost(Ipv4Addr),
    SetRouter(Ipv4Addr),
    SetNetmask(Ipv4Addr),
    SetEth(MacAddr),
    AppInit,
    Input,
    Periodic(usize),
    UdpPeriodic(usize),
    IpIn,
    ArpIn,
    ArpOut,
    ArpTimer,
    Send(usize),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn new_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct MockEngine {
    log: CallLog,
    pub connections: usize,
    pub datagrams: usize,
    /// Output length `input` leaves behind
    pub input_reply: usize,
    /// Output length per connection slot
    pub periodic_output: BTreeMap<usize, usize>,
    /// Output length per datagram slot
    pub udp_output: BTreeMap<usize, usize>,
}

impl MockEngine {
    pub fn new(log: &CallLog, connections: usize, datagrams: usize) -> Self {
        Self {
            log: Rc::clone(log),
            connections,
            datagrams,
            input_reply: 0,
            periodic_output: BTreeMap::new(),
            udp_output: BTreeMap::new(),
        }
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl ProtocolEngine for MockEngine {
    fn init(&mut self) {
        self.record(Call::Init);
    }

    fn set_host_addr(&mut self, addr: Ipv4Addr) {
        self.record(Call::SetHost(addr));
    }

    fn set_router_addr(&mut self, addr: Ipv4Addr) {
        self.record(Call::SetRouter(addr));
    }

    fn set_netmask(&mut self, addr: Ipv4Addr) {
        self.record(Call::SetNetmask(addr));
    }

    fn set_eth_addr(&mut self, mac: MacAddr) {
        self.record(Call::SetEth(mac));
    }

    fn app_init(&mut self) {
        self.record(Call::AppInit);
    }

    fn connection_slots(&self) -> usize {
        self.connections
    }

    fn datagram_slots(&self) -> usize {
        self.datagrams
    }

    fn input(&mut self, ctx: &mut NetContext) {
        self.record(Call::Input);
        ctx.buffer_mut().set_len(self.input_reply).unwrap();
    }

    fn periodic(&mut self, slot: usize, ctx: &mut NetContext) {
        self.record(Call::Periodic(slot));
        if let Some(&len) = self.periodic_output.get(&slot) {
            ctx.buffer_mut().set_len(len).unwrap();
        }
    }

    fn udp_periodic(&mut self, slot: usize, ctx: &mut NetContext) {
        self.record(Call::UdpPeriodic(slot));
        if let Some(&len) = self.udp_output.get(&slot) {
            ctx.buffer_mut().set_len(len).unwrap();
        }
    }
}

pub struct MockArp {
    log: CallLog,
    /// Output length `arp_in` leaves behind
    pub arp_reply: usize,
}

impl MockArp {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            arp_reply: 0,
        }
    }
}

impl ArpEngine for MockArp {
    fn ip_in(&mut self, _ctx: &mut NetContext) {
        self.log.borrow_mut().push(Call::IpIn);
    }

    fn arp_in(&mut self, ctx: &mut NetContext) {
        self.log.borrow_mut().push(Call::ArpIn);
        ctx.buffer_mut().set_len(self.arp_reply).unwrap();
    }

    fn arp_out(&mut self, _ctx: &mut NetContext) {
        self.log.borrow_mut().push(Call::ArpOut);
    }

    fn timer(&mut self) {
        self.log.borrow_mut().push(Call::ArpTimer);
    }
}

/// What the next `read` returns
pub enum Rx {
    Frame(Vec<u8>),
    Fail(ReceiveError),
    /// Report a length without writing anything
    Length(usize),
}

pub struct MockLink {
    log: CallLog,
    rx: Rc<RefCell<VecDeque<Rx>>>,
    pub sent: Rc<RefCell<Vec<Vec<u8>>>>,
    pub refuse_sends: bool,
}

impl MockLink {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            rx: Rc::new(RefCell::new(VecDeque::new())),
            sent: Rc::new(RefCell::new(Vec::new())),
            refuse_sends: false,
        }
    }

    /// Shared handle to the receive queue, usable after the link is moved
    pub fn rx_queue(&self) -> Rc<RefCell<VecDeque<Rx>>> {
        Rc::clone(&self.rx)
    }
}

impl LinkDevice for MockLink {
    fn mac_address(&self, _port: u8) -> MacAddr {
        TEST_MAC
    }

    fn read(&mut self, _port: u8, buf: &mut [u8]) -> Result<usize, ReceiveError> {
        match self.rx.borrow_mut().pop_front() {
            None => Ok(0),
            Some(Rx::Frame(frame)) => {
                buf[..frame.len()].copy_from_slice(&frame);
                Ok(frame.len())
            }
            Some(Rx::Fail(e)) => Err(e),
            Some(Rx::Length(len)) => Ok(len),
        }
    }

    fn send(&mut self, _port: u8, frame: &[u8]) -> Result<(), TransmitError> {
        self.log.borrow_mut().push(Call::Send(frame.len()));
        if self.refuse_sends {
            return Err(TransmitError::BufferFull);
        }
        self.sent.borrow_mut().push(frame.to_vec());
        Ok(())
    }
}

/// Raw frame with the given EtherType and a zeroed payload
pub fn frame(ethertype: u16, payload_len: usize) -> Vec<u8> {
    let mut frame = vec![0u8; HEADER_SIZE + payload_len];
    frame[..6].copy_from_slice(&[0xff; 6]);
    frame[6..12].copy_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
    frame[12..14].copy_from_slice(&ethertype.to_be_bytes());
    frame
}

pub fn ipv4_frame() -> Vec<u8> {
    frame(ETHERTYPE_IPV4, 46)
}

pub fn arp_frame() -> Vec<u8> {
    frame(ETHERTYPE_ARP, 28)
}

pub type TestTask = NetworkTask<MockEngine, MockArp, MockLink, Arc<TickCounter>>;

/// Everything a network task test needs, with handles kept outside the task
pub struct Harness {
    pub log: CallLog,
    pub clock: Arc<TickCounter>,
    pub rx: Rc<RefCell<VecDeque<Rx>>>,
    pub sent: Rc<RefCell<Vec<Vec<u8>>>>,
    pub task: TestTask,
}

impl Harness {
    pub fn new(config: &NetworkConfig, engine: impl FnOnce(&mut MockEngine), arp_reply: usize) -> Self {
        let log = new_log();
        let clock = Arc::new(TickCounter::new(16));
        let mut mock_engine = MockEngine::new(&log, 4, 2);
        engine(&mut mock_engine);
        let mut arp = MockArp::new(&log);
        arp.arp_reply = arp_reply;
        let link = MockLink::new(&log);
        let rx = link.rx_queue();
        let sent = Rc::clone(&link.sent);
        let task = NetworkTask::new(config, mock_engine, arp, link, Arc::clone(&clock))
            .expect("valid config");
        // drop the bring-up calls so tests only see loop activity
        log.borrow_mut().clear();
        Self {
            log,
            clock,
            rx,
            sent,
            task,
        }
    }

    pub fn push_rx(&self, rx: Rx) {
        self.rx.borrow_mut().push_back(rx);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.log.borrow_mut().clear();
    }
}
