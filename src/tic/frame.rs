//! # TIC Frame Encoder
//!
//! Builds wire bytes for datasets and frames in either convention. Meters
//! only transmit, so this side exists to produce replay captures, test
//! vectors and simulator output.
//!
//! ```rust
//! use tic_rs::tic::frame::pack_dataset;
//! use tic_rs::tic::Splitter;
//! use tic_rs::Dataset;
//!
//! let papp = Dataset::new("PAPP", "00750").unwrap();
//! assert_eq!(&pack_dataset(&papp, Splitter::Historic)[..], b"\nPAPP 00750 -\r");
//! ```

use crate::constants::{TIC_DATASET_END, TIC_DATASET_START, TIC_FRAME_END, TIC_FRAME_START};
use crate::tic::checksum::Splitter;
use crate::tic::dataset::Dataset;
use crate::tic::parity::ParityCheck;
use bytes::{BufMut, BytesMut};

/// Packs raw dataset fields without validating them.
///
/// Used directly for malformed test input (oversized tags and the like).
pub fn pack_dataset_fields(
    buf: &mut BytesMut,
    tag: &[u8],
    timestamp: Option<&[u8]>,
    data: &[u8],
    splitter: Splitter,
) {
    let sep = splitter.as_byte();
    let mut body = BytesMut::with_capacity(tag.len() + data.len() + 16);
    body.put_slice(tag);
    body.put_u8(sep);
    if let Some(timestamp) = timestamp {
        body.put_slice(timestamp);
        body.put_u8(sep);
    }
    body.put_slice(data);
    body.put_u8(sep);

    buf.put_u8(TIC_DATASET_START);
    buf.put_slice(&body);
    buf.put_u8(splitter.checksum(&body));
    buf.put_u8(TIC_DATASET_END);
}

/// Packs one dataset as `LF tag SEP data SEP checksum CR`.
pub fn pack_dataset(dataset: &Dataset, splitter: Splitter) -> BytesMut {
    let mut buf = BytesMut::with_capacity(dataset.tag().len() + dataset.data().len() + 5);
    pack_dataset_fields(
        &mut buf,
        dataset.tag().as_bytes(),
        None,
        dataset.data().as_bytes(),
        splitter,
    );
    buf
}

/// Packs a full `STX datasets ETX` frame.
pub fn pack_frame(datasets: &[Dataset], splitter: Splitter) -> BytesMut {
    let mut buf = BytesMut::with_capacity(2 + datasets.len() * 32);
    buf.put_u8(TIC_FRAME_START);
    for dataset in datasets {
        buf.put_slice(&pack_dataset(dataset, splitter));
    }
    buf.put_u8(TIC_FRAME_END);
    buf
}

/// Sets the parity bit of every byte, as a meter does on the wire.
pub fn apply_parity(bytes: &[u8], parity: ParityCheck) -> Vec<u8> {
    bytes.iter().map(|&b| parity.apply(b)).collect()
}
