//! # FixedBuffer - Bounded Working Buffer
//!
//! A stack-allocated byte buffer with an explicit length. Every append is
//! checked against the capacity before writing, so an oversized input turns
//! into a `CapacityExceeded` error instead of a silent overflow.
//!
//! ## Usage
//!
//! ```rust
//! use tic_rs::util::FixedBuffer;
//!
//! let mut buffer: FixedBuffer<4> = FixedBuffer::new();
//! buffer.push(0x41).unwrap();
//! buffer.push(0x42).unwrap();
//! assert_eq!(buffer.as_slice(), b"AB");
//! ```

use thiserror::Error;

/// Errors that can occur during FixedBuffer operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedBufferError {
    #[error("Capacity limit exceeded: {limit}")]
    CapacityExceeded { limit: usize },
}

/// Fixed-capacity byte buffer
#[derive(Debug, Clone)]
pub struct FixedBuffer<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            len: 0,
        }
    }

    /// Append one byte, failing when the buffer is already full
    pub fn push(&mut self, byte: u8) -> Result<(), FixedBufferError> {
        if self.len >= N {
            return Err(FixedBufferError::CapacityExceeded { limit: N });
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget the content; the backing array is not zeroed
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for FixedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
