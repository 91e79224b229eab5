//! # TIC Stream Decoder
//!
//! [`TicDecoder`] owns a non-blocking [`ByteSource`] and a [`FrameParser`]. Each
//! call to [`TicDecoder::poll`] drains the bytes that are already available and
//! returns as soon as one dataset is complete, so it can share a single
//! polling loop with other periodic work.
//!
//! ```rust
//! use std::collections::VecDeque;
//! use tic_rs::tic::{DecodeOutcome, ParityCheck, Splitter, TicDecoder};
//! use tic_rs::tic::frame::{apply_parity, pack_frame};
//! use tic_rs::Dataset;
//!
//! let papp = Dataset::new("PAPP", "00750").unwrap();
//! let wire = apply_parity(&pack_frame(&[papp.clone()], Splitter::Historic), ParityCheck::Even);
//!
//! let mut decoder = TicDecoder::new(VecDeque::from(wire));
//! assert_eq!(decoder.poll(), DecodeOutcome::Produced(papp));
//! assert_eq!(decoder.poll(), DecodeOutcome::Empty);
//! ```

use crate::error::TicError;
use crate::instrumentation::stats::DecoderStats;
use crate::tic::dataset::Dataset;
use crate::tic::parity::ParityCheck;
use crate::tic::parser::{FrameParser, ParseEvent, ParserState};
use crate::util::logging::span_decode_pass;
use std::collections::VecDeque;

/// Non-blocking access to received bytes.
pub trait ByteSource {
    /// Returns the next received byte, or `Ok(None)` when nothing is pending.
    ///
    /// Implementations must never wait for data to arrive.
    fn read_byte(&mut self) -> Result<Option<u8>, TicError>;
}

impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> Result<Option<u8>, TicError> {
        Ok(self.pop_front())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Result<Option<u8>, TicError> {
        (**self).read_byte()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self) -> Result<Option<u8>, TicError> {
        (**self).read_byte()
    }
}

/// Result of one [`TicDecoder::poll`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// One validated dataset; later bytes stay in the source.
    Produced(Dataset),
    /// Every available byte was consumed without completing a dataset.
    Empty,
    /// A protocol or transport error. After a protocol error the decoder is
    /// already back to waiting for a frame start.
    Error(TicError),
}

impl DecodeOutcome {
    pub fn dataset(self) -> Option<Dataset> {
        match self {
            DecodeOutcome::Produced(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DecodeOutcome::Error(_))
    }
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderConfig {
    pub parity: ParityCheck,
}

/// Streaming TIC decoder over a [`ByteSource`].
pub struct TicDecoder<S> {
    source: S,
    parser: FrameParser,
    config: DecoderConfig,
    stats: DecoderStats,
}

impl<S: ByteSource> TicDecoder<S> {
    /// Creates a decoder with even parity checking, which is what meters
    /// send (7E1). Use [`with_config`](Self::with_config) for odd parity.
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        TicDecoder {
            source,
            parser: FrameParser::new(),
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Drains available bytes until a dataset completes, the source runs dry
    /// or an error occurs.
    ///
    /// A parity error aborts the pass right away; bytes behind the bad one
    /// are left in the source for the next call.
    pub fn poll(&mut self) -> DecodeOutcome {
        let _span = span_decode_pass(self.parser.state().name());

        loop {
            let raw = match self.source.read_byte() {
                Ok(Some(raw)) => raw,
                Ok(None) => return DecodeOutcome::Empty,
                Err(err) => {
                    // Nothing was consumed, so the parser keeps its place.
                    self.stats.record_error(&err);
                    log::debug!("Byte source error: {err}");
                    return DecodeOutcome::Error(err);
                }
            };
            self.stats.bytes_received += 1;

            let byte = match self.config.parity.strip(raw) {
                Ok(byte) => byte,
                Err(err) => return self.fail(err),
            };

            match self.parser.feed(byte) {
                Ok(ParseEvent::Dataset(dataset)) => {
                    self.stats.datasets_decoded += 1;
                    log::debug!("Received dataset {dataset}");
                    return DecodeOutcome::Produced(dataset);
                }
                Ok(ParseEvent::FrameStarted) => self.stats.frames_started += 1,
                Ok(ParseEvent::FrameEnded) => self.stats.frames_completed += 1,
                Ok(ParseEvent::None) => {}
                Err(err) => return self.fail(err),
            }
        }
    }

    /// Lazily yields datasets and errors until the source has nothing left.
    pub fn drain(&mut self) -> impl Iterator<Item = Result<Dataset, TicError>> + '_ {
        std::iter::from_fn(move || match self.poll() {
            DecodeOutcome::Produced(dataset) => Some(Ok(dataset)),
            DecodeOutcome::Error(err) => Some(Err(err)),
            DecodeOutcome::Empty => None,
        })
    }

    fn fail(&mut self, err: TicError) -> DecodeOutcome {
        self.parser.reset();
        self.stats.record_error(&err);
        log::debug!("Parse error: {err}");
        DecodeOutcome::Error(err)
    }
}

impl<S> TicDecoder<S> {
    /// Forces the parser back to waiting for a frame start and drops any
    /// partial dataset. Bytes still in the source are untouched.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.stats.resets += 1;
    }

    pub fn state(&self) -> ParserState {
        self.parser.state()
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Swaps the byte source, e.g. after reopening the port at a new rate.
    /// The parser is reset since the old stream position is meaningless.
    pub fn replace_source(&mut self, source: S) -> S {
        self.reset();
        std::mem::replace(&mut self.source, source)
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tic::checksum::Splitter;
    use crate::tic::frame::{apply_parity, pack_frame};

    fn wire(datasets: &[Dataset], splitter: Splitter) -> VecDeque<u8> {
        VecDeque::from(apply_parity(&pack_frame(datasets, splitter), ParityCheck::Even))
    }

    #[test]
    fn test_one_dataset_per_poll() {
        let a = Dataset::new("ADCO", "123456789012").unwrap();
        let b = Dataset::new("IINST", "002").unwrap();
        let mut decoder = TicDecoder::new(wire(&[a.clone(), b.clone()], Splitter::Historic));

        assert_eq!(decoder.poll(), DecodeOutcome::Produced(a));
        assert!(!decoder.source_mut().is_empty());
        assert_eq!(decoder.poll(), DecodeOutcome::Produced(b));
        assert_eq!(decoder.poll(), DecodeOutcome::Empty);
        assert_eq!(decoder.state(), ParserState::AwaitingFrameStart);
        assert_eq!(decoder.stats().frames_completed, 1);
    }

    #[test]
    fn test_parity_error_leaves_rest_in_source() {
        let mut source: VecDeque<u8> = VecDeque::new();
        // STX with its parity bit, then 'C' (0x43) without it
        source.extend([0x82, 0x0A, 0x43, 0x41, 0x41]);
        let mut decoder = TicDecoder::new(source);

        assert_eq!(decoder.poll(), DecodeOutcome::Error(TicError::ParityError(0x43)));
        assert_eq!(decoder.state(), ParserState::AwaitingFrameStart);
        assert_eq!(decoder.source_mut().len(), 2);
        assert_eq!(decoder.stats().parity_errors, 1);
    }

    #[test]
    fn test_reset_drops_partial_dataset() {
        let mut source: VecDeque<u8> = VecDeque::new();
        source.extend(apply_parity(b"\x02\nADCO 1234", ParityCheck::Even));
        let mut decoder = TicDecoder::new(source);

        assert_eq!(decoder.poll(), DecodeOutcome::Empty);
        assert_eq!(decoder.state(), ParserState::ParsingDataAwaitingDatasetEnd {
            splitter: Splitter::Historic
        });
        decoder.reset();
        assert_eq!(decoder.state(), ParserState::AwaitingFrameStart);
        assert_eq!(decoder.stats().resets, 1);
    }

    #[test]
    fn test_drain_collects_everything() {
        let datasets = vec![
            Dataset::new("ADSC", "041876543210").unwrap(),
            Dataset::new("SINSTS", "00750").unwrap(),
        ];
        let mut decoder = TicDecoder::new(wire(&datasets, Splitter::Standard));
        let decoded: Result<Vec<_>, _> = decoder.drain().collect();
        assert_eq!(decoded.unwrap(), datasets);
    }

    #[test]
    fn test_odd_parity_config() {
        let ds = Dataset::new("PAPP", "00750").unwrap();
        let bytes = apply_parity(&pack_frame(&[ds.clone()], Splitter::Historic), ParityCheck::Odd);
        let mut decoder = TicDecoder::with_config(
            VecDeque::from(bytes),
            DecoderConfig { parity: ParityCheck::Odd },
        );
        assert_eq!(decoder.poll(), DecodeOutcome::Produced(ds));
    }
}
