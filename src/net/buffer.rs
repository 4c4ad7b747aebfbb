//! Shared frame buffer
//!
//! One buffer serves both directions. The link layer reads a frame into it
//! and sets the length; the protocol engine then processes the frame in
//! place and leaves a nonzero length behind when it wants the buffer
//! transmitted.

use thiserror::Error;

use super::ethernet::MAX_FRAME_SIZE;

/// Size of the shared frame buffer
pub const FRAME_BUFFER_SIZE: usize = MAX_FRAME_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("length {len} exceeds buffer capacity {capacity}")]
    PacketTooLarge { len: usize, capacity: usize },
}

pub struct FrameBuffer {
    data: [u8; FRAME_BUFFER_SIZE],
    len: usize,
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; FRAME_BUFFER_SIZE],
            len: 0,
        }
    }

    /// Valid bytes: the received frame, or the output to transmit
    pub fn frame(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The whole buffer, regardless of the current length
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set_len(&mut self, len: usize) -> Result<(), BufferError> {
        if len > FRAME_BUFFER_SIZE {
            return Err(BufferError::PacketTooLarge {
                len,
                capacity: FRAME_BUFFER_SIZE,
            });
        }
        self.len = len;
        Ok(())
    }

    /// Copy `bytes` to the start of the buffer and set the length to match.
    pub fn fill(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.set_len(bytes.len())?;
        self.data[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn capacity(&self) -> usize {
        FRAME_BUFFER_SIZE
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
