use std::io::Write;
use tempfile::NamedTempFile;
use tic_rs::tic::frame::{apply_parity, pack_frame};
use tic_rs::tic::{LastValueCache, ParityCheck, Splitter};
use tic_rs::{Dataset, DecoderConfig, TicError};

fn capture(frames: &[Vec<Dataset>]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for frame in frames {
        bytes.extend(apply_parity(&pack_frame(frame, Splitter::Historic), ParityCheck::Even));
    }
    bytes
}

#[test]
fn test_replay_capture_file() {
    let frames = vec![
        vec![
            Dataset::new("ADCO", "031762120135").unwrap(),
            Dataset::new("PAPP", "00450").unwrap(),
        ],
        vec![
            Dataset::new("ADCO", "031762120135").unwrap(),
            Dataset::new("PAPP", "00470").unwrap(),
        ],
    ];

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&capture(&frames)).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    let decoded: Vec<_> = tic_rs::decode_bytes(&bytes)
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded.len(), 4);

    // Only the first ADCO and both PAPP values count as changes
    let mut cache = LastValueCache::new();
    let changed: Vec<_> = decoded.iter().filter(|ds| cache.record(ds)).collect();
    assert_eq!(changed.len(), 3);
    assert_eq!(cache.get("PAPP"), Some("00470"));
}

#[test]
fn test_truncated_capture() {
    let frames = vec![vec![
        Dataset::new("IINST", "002").unwrap(),
        Dataset::new("PAPP", "00450").unwrap(),
    ]];
    let mut bytes = capture(&frames);
    bytes.truncate(bytes.len() - 4);

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let results = tic_rs::decode_bytes(&std::fs::read(file.path()).unwrap());
    assert_eq!(results, vec![Ok(Dataset::new("IINST", "002").unwrap())]);
}

#[test]
fn test_capture_with_stripped_parity_needs_odd_config() {
    // A capture taken with a 7O1 port setting carries odd parity bits
    let frame = pack_frame(&[Dataset::new("IINST", "002").unwrap()], Splitter::Historic);
    let bytes = apply_parity(&frame, ParityCheck::Odd);

    let even = tic_rs::decode_bytes(&bytes);
    assert!(matches!(even[0], Err(TicError::ParityError(_))));

    let odd = tic_rs::decode_bytes_with_config(&bytes, DecoderConfig { parity: ParityCheck::Odd });
    assert_eq!(odd, vec![Ok(Dataset::new("IINST", "002").unwrap())]);
}
