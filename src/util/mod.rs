//! # Utility Modules
//!
//! Common helpers used throughout the tic-rs crate: the bounded dataset
//! buffer, hex encoding/decoding and logging patterns.

pub mod fixed_buffer;
pub mod hex;
pub mod logging;

// Re-export commonly used types and functions
pub use fixed_buffer::{FixedBuffer, FixedBufferError};
pub use hex::{encode_hex_upper, format_dataset_bytes, format_hex_compact, parse_hex_lenient};
pub use logging::{log_dataset_hex, LogThrottle};
