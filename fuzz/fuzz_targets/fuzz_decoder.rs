#![no_main]

use libfuzzer_sys::fuzz_target;
use std::collections::VecDeque;
use tic_rs::tic::{DecodeOutcome, DecoderConfig, ParityCheck, ParserState, TicDecoder};

fuzz_target!(|data: &[u8]| {
    // Both parity conventions, so the parser sees mostly valid bytes in one of them
    for parity in [ParityCheck::Even, ParityCheck::Odd] {
        let mut decoder =
            TicDecoder::with_config(VecDeque::from(data.to_vec()), DecoderConfig { parity });
        loop {
            match decoder.poll() {
                DecodeOutcome::Empty => break,
                DecodeOutcome::Error(err) => {
                    assert!(err.is_protocol_error());
                    assert_eq!(decoder.state(), ParserState::AwaitingFrameStart);
                }
                DecodeOutcome::Produced(dataset) => {
                    assert!(!dataset.tag().is_empty() && dataset.tag().len() <= 8);
                }
            }
        }
    }

    // Same bytes with the parity bits already stripped
    let stripped: Vec<u8> = data.iter().map(|b| ParityCheck::Even.apply(*b)).collect();
    let _ = tic_rs::decode_bytes(&stripped);
});
