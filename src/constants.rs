//! TIC Protocol Constants
//!
//! This module defines constants used in the TIC protocol implementation,
//! based on the Enedis-NOI-CPT_54E specification (historic and standard modes).

// ----------------------------------------------------------------------------
// Frame/dataset delimiters
// ----------------------------------------------------------------------------

/// Start of frame (STX)
pub const TIC_FRAME_START: u8 = 0x02;

/// End of frame (ETX)
pub const TIC_FRAME_END: u8 = 0x03;

/// Start of dataset (LF)
pub const TIC_DATASET_START: u8 = 0x0A;

/// End of dataset (CR)
pub const TIC_DATASET_END: u8 = 0x0D;

/// Field splitter of the standard encoding (HT)
pub const TIC_SPLITTER_STANDARD: u8 = 0x09;

/// Field splitter of the historic encoding (SP)
pub const TIC_SPLITTER_HISTORIC: u8 = 0x20;

// ----------------------------------------------------------------------------
// Byte layout
// ----------------------------------------------------------------------------

/// Parity bit position on the wire
pub const TIC_PARITY_BIT: u8 = 0x80;

/// Mask of the 7 data bits
pub const TIC_DATA_MASK: u8 = 0x7F;

/// Checksum keeps the low 6 bits of the sum
pub const TIC_CHECKSUM_MASK: u8 = 0x3F;

/// Offset added to the masked sum so the checksum is printable
pub const TIC_CHECKSUM_OFFSET: u8 = 0x20;

// ----------------------------------------------------------------------------
// Buffer bounds
// ----------------------------------------------------------------------------

/// Maximum tag length
pub const TIC_TAG_MAX_LEN: usize = 8;

/// Maximum timestamp field length (season flag + YYMMDDhhmmss)
pub const TIC_TIMESTAMP_MAX_LEN: usize = 13;

/// Value length the 3-field layout is sized for
pub const TIC_VALUE_NOMINAL_LEN: usize = 12;

/// Dataset working buffer: tag, splitter, timestamp, splitter, value, splitter, checksum
pub const TIC_DATASET_BUFFER_CAPACITY: usize =
    TIC_TAG_MAX_LEN + 1 + TIC_TIMESTAMP_MAX_LEN + 1 + TIC_VALUE_NOMINAL_LEN + 1 + 1;

/// Longest value a 2-field dataset can carry: 1-byte tag, two splitters and the checksum
pub const TIC_DATA_MAX_LEN: usize = TIC_DATASET_BUFFER_CAPACITY - 4;

// ----------------------------------------------------------------------------
// Baud rate detection
// ----------------------------------------------------------------------------

/// Number of low pulses sampled during detection
pub const TIC_DETECTION_SAMPLES: usize = 10;

/// Narrowest pulse accepted as a 1200 baud bit (nominal 833 us)
pub const TIC_PULSE_1200_MIN_US: u64 = 666;

/// Widest pulse accepted as a 1200 baud bit
pub const TIC_PULSE_1200_MAX_US: u64 = 1000;

/// Narrowest pulse accepted as a 9600 baud bit (nominal 104 us)
pub const TIC_PULSE_9600_MIN_US: u64 = 83;

/// Widest pulse accepted as a 9600 baud bit
pub const TIC_PULSE_9600_MAX_US: u64 = 125;
