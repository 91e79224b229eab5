//! # tic-rs - A Rust Crate for the TIC (Télé-Information Client) Protocol
//!
//! The tic-rs crate decodes the customer information stream that French
//! electricity meters (Linky and its predecessors) emit on their TIC output:
//! a 7E1 serial line at 1200 baud (historic mode) or 9600 baud (standard
//! mode) carrying frames of `tag/value` datasets.
//!
//! ## Features
//!
//! - Detect the line rate from raw pulse widths before attaching the UART
//! - Decode frames incrementally from a non-blocking byte source, one dataset per poll
//! - Validate parity, framing, tag/value bounds and both checksum conventions
//! - Resynchronise on the next frame after any protocol error
//! - Build wire bytes for tests, captures and simulation
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! tic-rs = "0.1.0"
//! ```
//!
//! ```rust
//! use tic_rs::{decode_bytes, Dataset};
//! use tic_rs::tic::frame::{apply_parity, pack_frame};
//! use tic_rs::tic::{ParityCheck, Splitter};
//!
//! let iinst = Dataset::new("IINST", "002").unwrap();
//! let wire = apply_parity(&pack_frame(&[iinst.clone()], Splitter::Historic), ParityCheck::Even);
//! assert_eq!(decode_bytes(&wire), vec![Ok(iinst)]);
//! ```

pub mod constants;
pub mod error;
pub mod instrumentation;
pub mod logging;
pub mod tic;
pub mod util;

use std::collections::VecDeque;

pub use crate::error::TicError;
pub use crate::logging::{init_logger, log_info};

// Core TIC types
pub use tic::{
    BaudRate, ByteSource, DecodeOutcome, DecoderConfig, LastValueCache, ParityCheck, PulseReader,
    SerialByteSource, SerialConfig, SessionConfig, Splitter, TicDecoder, TicSession,
};
pub use tic::dataset::Dataset;

// Instrumentation
pub use instrumentation::{DecoderStats, LinkMonitor, LinkStatus};

/// Open a serial port as a ready-to-poll decoder.
///
/// # Arguments
/// * `port` - Serial port path (e.g., "/dev/ttyAMA0" or "/dev/ttyUSB0")
/// * `baud_rate` - Line rate, as given or as returned by [`tic::detect_or_configure`]
///
/// # Returns
/// * `Ok(TicDecoder)` - Decoder over the opened port, even parity checked
/// * `Err(TicError)` - The port could not be opened
pub fn open(port: &str, baud_rate: BaudRate) -> Result<TicDecoder<SerialByteSource>, TicError> {
    let source = SerialByteSource::open(SerialConfig::new(port, baud_rate))?;
    Ok(TicDecoder::new(source))
}

/// Decode a complete byte capture with even parity.
///
/// Returns every dataset and every error in stream order.
pub fn decode_bytes(bytes: &[u8]) -> Vec<Result<Dataset, TicError>> {
    decode_bytes_with_config(bytes, DecoderConfig::default())
}

/// Decode a complete byte capture with an explicit configuration.
pub fn decode_bytes_with_config(
    bytes: &[u8],
    config: DecoderConfig,
) -> Vec<Result<Dataset, TicError>> {
    let source: VecDeque<u8> = bytes.iter().copied().collect();
    let mut decoder = TicDecoder::with_config(source, config);
    let decoded = decoder.drain().collect();
    decoded
}
