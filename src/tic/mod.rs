//! # TIC Protocol
//!
//! Decoding of the French "Télé-Information Client" serial stream sent by
//! Linky and earlier electricity meters.
//!
//! The pipeline, from the wire inward:
//! - [`baud`]: one-shot line-rate detection over a blocking [`PulseReader`],
//! - [`parity`]: 7E1 parity check and strip,
//! - [`parser`]: frame/dataset state machine with a bounded buffer,
//! - [`checksum`] and [`dataset`]: validation of a completed dataset,
//! - [`decoder`]: the non-blocking [`TicDecoder`] tying it together,
//! - [`session`]: a decoder that redetects and resets when the link fails.
//!
//! [`frame`] goes the other way and builds wire bytes.

pub mod baud;
pub mod cache;
pub mod checksum;
pub mod dataset;
pub mod decoder;
pub mod frame;
#[cfg(feature = "raspberry-pi")]
pub mod gpio;
pub mod mock;
pub mod parity;
pub mod parser;
pub mod serial;
pub mod session;

pub use baud::{detect_or_configure, BaudDetector, BaudRate, DetectorConfig, PulseReader};
pub use cache::LastValueCache;
pub use checksum::Splitter;
pub use dataset::Dataset;
pub use decoder::{ByteSource, DecodeOutcome, DecoderConfig, TicDecoder};
#[cfg(feature = "raspberry-pi")]
pub use gpio::RppalPulseReader;
pub use parity::ParityCheck;
pub use parser::ParserState;
pub use serial::{SerialByteSource, SerialConfig};
pub use session::{Retune, SessionConfig, TicSession};
