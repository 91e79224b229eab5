//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers used for log output, the CLI `decode`/`simulate` commands and
//! test vectors.
//!
//! ## Usage
//!
//! ```rust
//! use tic_rs::util::hex::{format_hex_compact, parse_hex_lenient};
//!
//! let bytes = parse_hex_lenient("02 0A 41").unwrap();
//! assert_eq!(bytes, vec![0x02, 0x0A, 0x41]);
//! assert_eq!(format_hex_compact(&bytes), "02 0a 41");
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to uppercase hex string
pub fn encode_hex_upper(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Format hex data for compact display (useful for logs)
///
/// Formats data as "02 0a 41" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render dataset bytes for humans: printable ASCII as-is, the rest as `<XX>`
///
/// TAB splitters and control bytes stay visible this way.
pub fn format_dataset_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &byte in data {
        if byte.is_ascii_graphic() {
            out.push(byte as char);
        } else {
            out.push_str(&format!("<{:02X}>", byte));
        }
    }
    out
}

/// Parse hex string that may contain spaces or other separators
///
/// Strips all non-hex characters, so `"02:0A 41"` works.
pub fn parse_hex_lenient(input: &str) -> Result<Vec<u8>, HexError> {
    let hex_chars: String = input.chars().filter(|c| c.is_ascii_hexdigit()).collect();

    if hex_chars.is_empty() {
        return Err(HexError::EmptyString);
    }

    if hex_chars.len() % 2 != 0 {
        return Err(HexError::OddLength(hex_chars.len()));
    }

    hex::decode(&hex_chars).map_err(|e| HexError::DecodeError(e.to_string()))
}
