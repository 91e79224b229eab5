//! # TIC Datasets
//!
//! A dataset is one `LF tag SEP [timestamp SEP] value SEP checksum CR`
//! record. This module holds the decoded [`Dataset`] type and the `nom`
//! field splitter used once a dataset body has passed its checksum.

use crate::constants::{TIC_DATA_MAX_LEN, TIC_TAG_MAX_LEN};
use crate::error::TicError;
use crate::tic::checksum::Splitter;
use nom::bytes::complete::{tag, take_till};
use nom::multi::separated_list1;
use nom::IResult;
use serde::Serialize;
use std::fmt;

/// A validated `(tag, value)` pair.
///
/// The tag is 1 to 8 printable ASCII bytes and the value is bounded by the
/// decoder's working buffer. The timestamp of 3-field datasets is not kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dataset {
    tag: String,
    data: String,
}

impl Dataset {
    /// Builds a dataset for encoding or comparison.
    ///
    /// Besides the decoder's length bounds, the tag must be graphic ASCII and
    /// the value printable ASCII, so that [`pack_frame`](crate::tic::frame::pack_frame)
    /// never emits a splitter or frame byte inside a field.
    pub fn new(tag: impl Into<String>, data: impl Into<String>) -> Result<Self, TicError> {
        let tag = tag.into();
        let data = data.into();

        if tag.is_empty() {
            return Err(TicError::InvalidField("empty tag".into()));
        }
        if tag.len() > TIC_TAG_MAX_LEN {
            return Err(TicError::TagTooLong);
        }
        if data.len() > TIC_DATA_MAX_LEN {
            return Err(TicError::DatasetTooLong);
        }
        if !tag.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(TicError::InvalidField(format!("tag {tag:?}")));
        }
        if !data.bytes().all(is_value_byte) {
            return Err(TicError::InvalidField(format!("value {data:?}")));
        }

        Ok(Dataset { tag, data })
    }

    /// Copies decoded fields as-is. The parser has already bounded the tag
    /// and the buffer, and parity stripping leaves 7-bit bytes only, so no
    /// content check applies here: control bytes inside a value are kept.
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Self {
        Dataset {
            tag: String::from_utf8_lossy(fields.tag).into_owned(),
            data: String::from_utf8_lossy(fields.data).into_owned(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.tag, self.data)
    }
}

/// Printable ASCII, SPACE included (standard-mode values may contain spaces).
fn is_value_byte(b: u8) -> bool {
    (0x20..0x7F).contains(&b)
}

/// Borrowed fields of a dataset body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields<'a> {
    pub tag: &'a [u8],
    /// Present for 3-field datasets only; not decoded.
    pub timestamp: Option<&'a [u8]>,
    pub data: &'a [u8],
}

fn split_on(input: &[u8], splitter: Splitter) -> IResult<&[u8], Vec<&[u8]>> {
    let separator: &'static [u8] = match splitter {
        Splitter::Standard => b"\t",
        Splitter::Historic => b" ",
    };
    let byte = splitter.as_byte();
    separated_list1(tag(separator), take_till(move |b| b == byte))(input)
}

/// Splits a dataset body (everything between LF and the checksum byte).
///
/// `n` splitters give `n + 1` pieces. Two splitters mean `tag`/`value`,
/// three mean `tag`/`timestamp`/`value`; anything else is
/// `InvalidFieldCount`. The value is the piece between the last two
/// splitters. Meters always end the body with a splitter, and any bytes
/// after the last one are ignored.
pub fn parse_fields(body: &[u8], splitter: Splitter) -> Result<Fields<'_>, TicError> {
    let (_, pieces) = split_on(body, splitter).map_err(|_| TicError::InvalidFieldCount(0))?;

    let splitters = pieces.len() - 1;
    let (name, timestamp, data) = match pieces.as_slice() {
        [name, data, _] => (*name, None, *data),
        [name, timestamp, data, _] => (*name, Some(*timestamp), *data),
        _ => return Err(TicError::InvalidFieldCount(splitters)),
    };

    Ok(Fields {
        tag: name,
        timestamp,
        data,
    })
}
