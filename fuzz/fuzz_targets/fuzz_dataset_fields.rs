#![no_main]

use libfuzzer_sys::fuzz_target;
use tic_rs::tic::dataset::parse_fields;
use tic_rs::tic::Splitter;

fuzz_target!(|data: &[u8]| {
    for splitter in [Splitter::Historic, Splitter::Standard] {
        if let Ok(fields) = parse_fields(data, splitter) {
            assert!(!fields.tag.contains(&splitter.as_byte()));
            assert!(!fields.data.contains(&splitter.as_byte()));
        }
        let _ = splitter.checksum(data);
    }
});
