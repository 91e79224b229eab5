//! # Decoder Statistics
//!
//! Counters kept by every [`TicDecoder`](crate::tic::TicDecoder): traffic
//! (bytes, frames, datasets) and one counter per error kind, so a flaky
//! line can be told apart from a misconfigured one (parity errors everywhere
//! usually mean the wrong baud rate).

use crate::error::TicError;
use serde::Serialize;

/// Error classes tracked by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorType {
    Parity,
    UnexpectedByte,
    TagTooLong,
    DatasetTooLong,
    Checksum,
    Splitter,
    FieldCount,
    Transport,
}

impl ErrorType {
    pub fn of(err: &TicError) -> Self {
        match err {
            TicError::ParityError(_) => ErrorType::Parity,
            TicError::UnexpectedByte(_) => ErrorType::UnexpectedByte,
            TicError::TagTooLong => ErrorType::TagTooLong,
            TicError::DatasetTooLong => ErrorType::DatasetTooLong,
            TicError::InvalidChecksum { .. } => ErrorType::Checksum,
            TicError::InvalidSplitter(_) => ErrorType::Splitter,
            TicError::InvalidFieldCount(_) => ErrorType::FieldCount,
            _ => ErrorType::Transport,
        }
    }
}

/// Running counters of one decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecoderStats {
    pub bytes_received: u64,
    pub frames_started: u64,
    pub frames_completed: u64,
    pub datasets_decoded: u64,
    pub parity_errors: u64,
    pub unexpected_bytes: u64,
    pub tag_too_long: u64,
    pub dataset_too_long: u64,
    pub checksum_errors: u64,
    pub splitter_errors: u64,
    pub field_count_errors: u64,
    pub transport_errors: u64,
    /// Explicit resets requested by the caller
    pub resets: u64,
}

impl DecoderStats {
    pub fn record_error(&mut self, err: &TicError) {
        let counter = match ErrorType::of(err) {
            ErrorType::Parity => &mut self.parity_errors,
            ErrorType::UnexpectedByte => &mut self.unexpected_bytes,
            ErrorType::TagTooLong => &mut self.tag_too_long,
            ErrorType::DatasetTooLong => &mut self.dataset_too_long,
            ErrorType::Checksum => &mut self.checksum_errors,
            ErrorType::Splitter => &mut self.splitter_errors,
            ErrorType::FieldCount => &mut self.field_count_errors,
            ErrorType::Transport => &mut self.transport_errors,
        };
        *counter += 1;
    }

    pub fn errors(&self, kind: ErrorType) -> u64 {
        match kind {
            ErrorType::Parity => self.parity_errors,
            ErrorType::UnexpectedByte => self.unexpected_bytes,
            ErrorType::TagTooLong => self.tag_too_long,
            ErrorType::DatasetTooLong => self.dataset_too_long,
            ErrorType::Checksum => self.checksum_errors,
            ErrorType::Splitter => self.splitter_errors,
            ErrorType::FieldCount => self.field_count_errors,
            ErrorType::Transport => self.transport_errors,
        }
    }

    /// All recoverable protocol errors.
    pub fn protocol_errors(&self) -> u64 {
        self.parity_errors
            + self.unexpected_bytes
            + self.tag_too_long
            + self.dataset_too_long
            + self.checksum_errors
            + self.splitter_errors
            + self.field_count_errors
    }

    /// Protocol errors per attempted dataset, in percent.
    pub fn error_rate(&self) -> f64 {
        let attempts = self.datasets_decoded + self.protocol_errors();
        if attempts == 0 {
            return 0.0;
        }
        self.protocol_errors() as f64 * 100.0 / attempts as f64
    }

    /// Export as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
