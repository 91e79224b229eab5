//! # Dataset Checksums
//!
//! A TIC checksum is the byte sum of part of the dataset, reduced to its low
//! 6 bits and shifted into the printable range with `+ 0x20`.
//!
//! Which bytes are summed depends on the splitter that follows the tag:
//! - historic datasets (SPACE) leave out the splitter right before the checksum,
//! - standard datasets (TAB) include it.
//!
//! Meters really do this, so both policies are kept exactly as transmitted.

use crate::constants::{
    TIC_CHECKSUM_MASK, TIC_CHECKSUM_OFFSET, TIC_SPLITTER_HISTORIC, TIC_SPLITTER_STANDARD,
};
use crate::error::TicError;
use serde::Serialize;

/// Field separator of a dataset, which also selects the checksum policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Splitter {
    /// SPACE, historic mode (1200 baud meters)
    Historic,
    /// TAB, standard mode (9600 baud meters)
    Standard,
}

impl Splitter {
    /// Wire value of the splitter.
    pub fn as_byte(self) -> u8 {
        match self {
            Splitter::Historic => TIC_SPLITTER_HISTORIC,
            Splitter::Standard => TIC_SPLITTER_STANDARD,
        }
    }

    /// The part of `body` covered by the checksum, `body` being the dataset
    /// bytes between LF and the checksum byte.
    pub fn checksum_span(self, body: &[u8]) -> &[u8] {
        match self {
            Splitter::Historic => &body[..body.len().saturating_sub(1)],
            Splitter::Standard => body,
        }
    }

    /// Computes the checksum of `body` under this splitter's policy.
    pub fn checksum(self, body: &[u8]) -> u8 {
        checksum(self.checksum_span(body))
    }

    /// Verifies a received checksum byte against `body`.
    pub fn verify(self, body: &[u8], received: u8) -> Result<(), TicError> {
        let calculated = self.checksum(body);
        if calculated != received {
            return Err(TicError::InvalidChecksum {
                expected: received,
                calculated,
            });
        }
        Ok(())
    }
}

impl TryFrom<u8> for Splitter {
    type Error = TicError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            TIC_SPLITTER_HISTORIC => Ok(Splitter::Historic),
            TIC_SPLITTER_STANDARD => Ok(Splitter::Standard),
            other => Err(TicError::InvalidSplitter(other)),
        }
    }
}

/// Sum of `bytes`, masked to 6 bits, plus 0x20. Always in `0x20..=0x5F`.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (sum & TIC_CHECKSUM_MASK) + TIC_CHECKSUM_OFFSET
}
