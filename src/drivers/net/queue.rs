//! In-memory link device
//!
//! Frames injected through a [`QueueHandle`] are returned by `read`, and
//! frames passed to `send` are kept for the handle to collect. Used to run
//! the network task on a host, against a tap bridge or a simulator, without
//! link hardware.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use crossbeam_queue::ArrayQueue;
use spin::Mutex;

use super::{LinkDevice, LinkStatus, ReceiveError, TransmitError};
use crate::net::ethernet::MacAddr;
use crate::task::semaphore::BinarySemaphore;

struct Shared {
    rx: ArrayQueue<Vec<u8>>,
    tx: Mutex<VecDeque<Vec<u8>>>,
    max_tx: usize,
    frame_ready: Mutex<Option<Arc<BinarySemaphore>>>,
}

/// Single-port queue-backed link device
pub struct QueueDevice {
    mac_addr: MacAddr,
    port: u8,
    shared: Arc<Shared>,
}

/// Producer/consumer side of a [`QueueDevice`]
#[derive(Clone)]
pub struct QueueHandle {
    shared: Arc<Shared>,
}

impl QueueDevice {
    /// # Arguments
    /// * `mac_addr` - MAC address reported for the port
    /// * `port` - The only port id this device answers to
    /// * `capacity` - Maximum number of frames queued in each direction
    pub fn new(mac_addr: MacAddr, port: u8, capacity: usize) -> Self {
        Self {
            mac_addr,
            port,
            shared: Arc::new(Shared {
                rx: ArrayQueue::new(capacity.max(1)),
                tx: Mutex::new(VecDeque::with_capacity(capacity)),
                max_tx: capacity.max(1),
                frame_ready: Mutex::new(None),
            }),
        }
    }

    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl QueueHandle {
    /// Queue a frame for the device to receive
    ///
    /// Gives the frame-ready semaphore, if one is attached. Returns the
    /// frame back when the receive queue is full.
    pub fn inject(&self, frame: Vec<u8>) -> Result<(), Vec<u8>> {
        self.shared.rx.push(frame)?;
        if let Some(sem) = self.shared.frame_ready.lock().as_ref() {
            sem.give();
        }
        Ok(())
    }

    /// Give `semaphore` every time a frame is injected
    pub fn notify(&self, semaphore: Arc<BinarySemaphore>) {
        *self.shared.frame_ready.lock() = Some(semaphore);
    }

    /// Take every frame transmitted so far, oldest first
    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        self.shared.tx.lock().drain(..).collect()
    }

    pub fn pending_rx(&self) -> usize {
        self.shared.rx.len()
    }
}

impl LinkDevice for QueueDevice {
    fn mac_address(&self, _port: u8) -> MacAddr {
        self.mac_addr
    }

    fn read(&mut self, port: u8, buf: &mut [u8]) -> Result<usize, ReceiveError> {
        if port != self.port {
            return Err(ReceiveError::NotReady(port));
        }
        let Some(frame) = self.shared.rx.pop() else {
            return Ok(0);
        };
        if frame.len() > buf.len() {
            return Err(ReceiveError::PacketTooLarge);
        }
        buf[..frame.len()].copy_from_slice(&frame);
        Ok(frame.len())
    }

    fn send(&mut self, port: u8, frame: &[u8]) -> Result<(), TransmitError> {
        if port != self.port {
            return Err(TransmitError::NotReady(port));
        }
        let mut queue = self.shared.tx.lock();
        if queue.len() >= self.shared.max_tx {
            return Err(TransmitError::BufferFull);
        }
        queue.push_back(frame.to_vec());
        Ok(())
    }

    fn link_status(&self, port: u8) -> LinkStatus {
        if port == self.port {
            LinkStatus::Up
        } else {
            LinkStatus::Down
        }
    }
}
