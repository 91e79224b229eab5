//! # TIC Frame Parser
//!
//! Byte-level state machine for `STX { LF dataset CR } ETX` frames. It works on
//! bytes whose parity bit has already been checked and stripped; the
//! [`TicDecoder`](crate::tic::decoder::TicDecoder) does that and drives it.
//!
//! Every grammar violation returns an error and leaves the parser in
//! [`ParserState::AwaitingFrameStart`]: the in-flight frame is dropped and the
//! parser resynchronises on the next STX.

use crate::constants::{
    TIC_DATASET_BUFFER_CAPACITY, TIC_DATASET_END, TIC_DATASET_START, TIC_FRAME_END,
    TIC_FRAME_START, TIC_TAG_MAX_LEN,
};
use crate::error::TicError;
use crate::tic::checksum::Splitter;
use crate::tic::dataset::{parse_fields, Dataset};
use crate::util::logging::log_dataset_hex;
use crate::util::FixedBuffer;

/// Represents the states of the frame parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for STX; everything else is ignored.
    AwaitingFrameStart,
    /// Inside a frame, between datasets.
    AwaitingDatasetOrFrameEnd,
    /// After LF, collecting the tag.
    ParsingTag,
    /// After the first splitter, collecting bytes up to CR.
    ParsingDataAwaitingDatasetEnd { splitter: Splitter },
}

impl ParserState {
    pub fn name(&self) -> &'static str {
        match self {
            ParserState::AwaitingFrameStart => "awaiting_frame_start",
            ParserState::AwaitingDatasetOrFrameEnd => "awaiting_dataset_or_frame_end",
            ParserState::ParsingTag => "parsing_tag",
            ParserState::ParsingDataAwaitingDatasetEnd { .. } => "parsing_data",
        }
    }
}

/// What a single byte did to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    None,
    FrameStarted,
    FrameEnded,
    Dataset(Dataset),
}

/// Frame/dataset state machine with a bounded working buffer.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParserState,
    buffer: FixedBuffer<TIC_DATASET_BUFFER_CAPACITY>,
}

impl FrameParser {
    pub fn new() -> Self {
        FrameParser {
            state: ParserState::AwaitingFrameStart,
            buffer: FixedBuffer::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Bytes of the dataset in progress.
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn reset(&mut self) {
        self.state = ParserState::AwaitingFrameStart;
        self.buffer.clear();
    }

    /// Feeds one 7-bit byte.
    pub fn feed(&mut self, byte: u8) -> Result<ParseEvent, TicError> {
        // On error the placeholder stays, which is the reset state.
        let state = std::mem::replace(&mut self.state, ParserState::AwaitingFrameStart);
        let (next, event) = self.step(state, byte)?;
        self.state = next;
        Ok(event)
    }

    fn step(&mut self, state: ParserState, byte: u8) -> Result<(ParserState, ParseEvent), TicError> {
        match state {
            ParserState::AwaitingFrameStart => match byte {
                TIC_FRAME_START => Ok((ParserState::AwaitingDatasetOrFrameEnd, ParseEvent::FrameStarted)),
                _ => Ok((ParserState::AwaitingFrameStart, ParseEvent::None)),
            },

            ParserState::AwaitingDatasetOrFrameEnd => match byte {
                TIC_DATASET_START => {
                    self.buffer.clear();
                    Ok((ParserState::ParsingTag, ParseEvent::None))
                }
                TIC_FRAME_END => Ok((ParserState::AwaitingFrameStart, ParseEvent::FrameEnded)),
                other => Err(TicError::UnexpectedByte(other)),
            },

            ParserState::ParsingTag => match Splitter::try_from(byte) {
                Ok(splitter) => {
                    if self.buffer.is_empty() {
                        return Err(TicError::UnexpectedByte(byte));
                    }
                    self.buffer.push(byte).map_err(|_| TicError::TagTooLong)?;
                    Ok((
                        ParserState::ParsingDataAwaitingDatasetEnd { splitter },
                        ParseEvent::None,
                    ))
                }
                Err(_) => {
                    if self.buffer.len() >= TIC_TAG_MAX_LEN {
                        return Err(TicError::TagTooLong);
                    }
                    self.buffer.push(byte).map_err(|_| TicError::TagTooLong)?;
                    Ok((ParserState::ParsingTag, ParseEvent::None))
                }
            },

            ParserState::ParsingDataAwaitingDatasetEnd { splitter } => match byte {
                TIC_DATASET_END => {
                    let dataset = self.finish_dataset(splitter)?;
                    Ok((ParserState::AwaitingDatasetOrFrameEnd, ParseEvent::Dataset(dataset)))
                }
                other => {
                    self.buffer
                        .push(other)
                        .map_err(|_| TicError::DatasetTooLong)?;
                    Ok((
                        ParserState::ParsingDataAwaitingDatasetEnd { splitter },
                        ParseEvent::None,
                    ))
                }
            },
        }
    }

    /// Validates the buffered dataset: checksum first, then the field layout.
    fn finish_dataset(&self, splitter: Splitter) -> Result<Dataset, TicError> {
        let bytes = self.buffer.as_slice();
        log_dataset_hex("Dataset", bytes);

        let (received, body) = match bytes.split_last() {
            Some((checksum, body)) if !body.is_empty() => (*checksum, body),
            _ => return Err(TicError::InvalidFieldCount(0)),
        };

        splitter.verify(body, received)?;
        let fields = parse_fields(body, splitter)?;
        Ok(Dataset::from_fields(&fields))
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> Result<Vec<Dataset>, TicError> {
        let mut out = Vec::new();
        for &b in bytes {
            if let ParseEvent::Dataset(ds) = parser.feed(b)? {
                out.push(ds);
            }
        }
        Ok(out)
    }

    #[test]
    fn test_historic_dataset() {
        let mut parser = FrameParser::new();
        let datasets = feed_all(&mut parser, b"\x02\nADCO 123456789012 G\r\x03").unwrap();
        assert_eq!(datasets, vec![Dataset::new("ADCO", "123456789012").unwrap()]);
        assert_eq!(parser.state(), ParserState::AwaitingFrameStart);
    }

    #[test]
    fn test_standard_dataset() {
        let mut parser = FrameParser::new();
        let datasets = feed_all(&mut parser, b"\x02\nADCO\t123456789012\t9\r").unwrap();
        assert_eq!(datasets[0].tag(), "ADCO");
        assert_eq!(parser.state(), ParserState::AwaitingDatasetOrFrameEnd);
    }

    #[test]
    fn test_garbage_before_frame_is_ignored() {
        let mut parser = FrameParser::new();
        let datasets = feed_all(&mut parser, b"xx\r\n\x03\x02\nADCO 123456789012 G\r").unwrap();
        assert_eq!(datasets.len(), 1);
    }

    #[test]
    fn test_unexpected_byte_between_datasets() {
        let mut parser = FrameParser::new();
        assert_eq!(
            feed_all(&mut parser, b"\x02Z"),
            Err(TicError::UnexpectedByte(b'Z'))
        );
        assert_eq!(parser.state(), ParserState::AwaitingFrameStart);
    }

    #[test]
    fn test_empty_tag_rejected() {
        let mut parser = FrameParser::new();
        assert_eq!(
            feed_all(&mut parser, b"\x02\n "),
            Err(TicError::UnexpectedByte(b' '))
        );
    }

    #[test]
    fn test_tag_limit() {
        let mut parser = FrameParser::new();
        feed_all(&mut parser, b"\x02\nABCDEFGH ").unwrap();
        assert_eq!(
            parser.state(),
            ParserState::ParsingDataAwaitingDatasetEnd {
                splitter: Splitter::Historic
            }
        );

        let mut parser = FrameParser::new();
        assert_eq!(
            feed_all(&mut parser, b"\x02\nABCDEFGHI"),
            Err(TicError::TagTooLong)
        );
        assert_eq!(parser.state(), ParserState::AwaitingFrameStart);
    }

    #[test]
    fn test_dataset_too_long() {
        let mut parser = FrameParser::new();
        let mut bytes = b"\x02\nA ".to_vec();
        bytes.extend(std::iter::repeat(b'1').take(TIC_DATASET_BUFFER_CAPACITY));
        assert_eq!(feed_all(&mut parser, &bytes), Err(TicError::DatasetTooLong));
        assert_eq!(parser.state(), ParserState::AwaitingFrameStart);
    }

    #[test]
    fn test_checksum_checked_before_field_count() {
        let mut parser = FrameParser::new();
        assert!(matches!(
            feed_all(&mut parser, b"\x02\nADCO 123456789012 H\r"),
            Err(TicError::InvalidChecksum { expected: b'H', calculated: b'G' })
        ));
    }

    #[test]
    fn test_buffer_cleared_between_datasets() {
        let mut parser = FrameParser::new();
        let datasets =
            feed_all(&mut parser, b"\x02\nADCO 123456789012 G\r\nPAPP 00750 -\r\x03").unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[1], Dataset::new("PAPP", "00750").unwrap());
        assert!(parser.buffered().starts_with(b"PAPP"));
    }
}
