//! # TIC Error Handling
//!
//! This module defines the TicError enum, which represents the different error
//! types that can occur in the tic-rs crate.
//!
//! Protocol errors are decoder-local: by the time one is returned the decoder
//! has already reset itself and is ready to resynchronise on the next call.

use thiserror::Error;

/// Represents the different error types that can occur in the TIC crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicError {
    /// A byte failed the parity check.
    #[error("Parity error on byte 0x{0:02X}")]
    ParityError(u8),

    /// A byte appeared where the frame grammar forbids it.
    #[error("Unexpected byte: 0x{0:02X}")]
    UnexpectedByte(u8),

    /// The tag exceeded 8 bytes before a splitter appeared.
    #[error("Tag too long")]
    TagTooLong,

    /// The dataset exceeded the working buffer before its terminator.
    #[error("Dataset too long")]
    DatasetTooLong,

    /// Indicates a checksum mismatch.
    #[error("Invalid checksum: expected 0x{expected:02X}, calculated 0x{calculated:02X}")]
    InvalidChecksum { expected: u8, calculated: u8 },

    /// A byte was used as a splitter but is neither TAB nor SPACE.
    #[error("Invalid splitter: 0x{0:02X}")]
    InvalidSplitter(u8),

    /// The splitter count at the dataset terminator was neither 2 nor 3.
    #[error("Invalid field count: {0} splitters")]
    InvalidFieldCount(usize),

    /// A caller-built dataset holds bytes the encoder cannot frame.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// The sampled pulse widths match no known baud rate.
    #[error("Baud rate detection failed (narrowest pulse {min_pulse_us} us)")]
    DetectionFailed { min_pulse_us: u64 },

    /// A rate other than 1200 or 9600 baud was requested.
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// Indicates an error reading the GPIO line.
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// The line did not change level in time.
    #[error("Timeout waiting for line transition")]
    Timeout,
}

impl TicError {
    /// True for the errors the decoder recovers from on its own.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            TicError::ParityError(_)
                | TicError::UnexpectedByte(_)
                | TicError::TagTooLong
                | TicError::DatasetTooLong
                | TicError::InvalidChecksum { .. }
                | TicError::InvalidSplitter(_)
                | TicError::InvalidFieldCount(_)
        )
    }
}

impl From<tokio_serial::Error> for TicError {
    fn from(err: tokio_serial::Error) -> Self {
        TicError::SerialPortError(err.to_string())
    }
}

impl From<std::io::Error> for TicError {
    fn from(err: std::io::Error) -> Self {
        TicError::SerialPortError(err.to_string())
    }
}
