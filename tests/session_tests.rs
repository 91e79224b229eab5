//! Reinitialisation of a decoding session: detection retries, the silence
//! watchdog and source replacement.

use std::time::Duration;
use tic_rs::tic::mock::{MockByteSource, MockPulseReader};
use tic_rs::tic::{ParityCheck, ParserState, Splitter};
use tic_rs::{BaudRate, Dataset, DecodeOutcome, LinkStatus, SessionConfig, TicError, TicSession};

/// Narrowest low pulse of a 1200 baud line.
const PULSE_1200_US: u64 = 833;
/// Narrowest low pulse of a 9600 baud line.
const PULSE_9600_US: u64 = 104;

fn config(stale_after: Duration) -> SessionConfig {
    SessionConfig {
        stale_after,
        retry_after: Duration::ZERO,
        ..SessionConfig::default()
    }
}

fn papp(value: &str) -> Dataset {
    Dataset::new("PAPP", value).unwrap()
}

#[test]
fn test_failed_detection_is_retried() {
    let mut widths = vec![300; 10];
    widths.extend([PULSE_1200_US; 10]);
    let line = MockByteSource::new();
    let mut session = TicSession::with_detection(
        line.clone(),
        MockPulseReader::from_micros(&widths),
        config(Duration::from_secs(60)),
    );

    assert_eq!(
        session.poll(),
        DecodeOutcome::Error(TicError::DetectionFailed { min_pulse_us: 300 })
    );
    assert_eq!(session.status(), LinkStatus::Invalid);
    assert_eq!(session.baud_rate(), None);
    assert_eq!(line.baud_rate(), None);

    // Second attempt sees a 1200 baud line and retunes the source
    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(session.baud_rate(), Some(BaudRate::Baud1200));
    assert_eq!(line.baud_rate(), Some(BaudRate::Baud1200));
    assert_eq!(session.status(), LinkStatus::Starting);

    line.queue_frame(&[papp("00750")], Splitter::Historic, ParityCheck::Even);
    assert_eq!(session.poll(), DecodeOutcome::Produced(papp("00750")));
    assert_eq!(session.status(), LinkStatus::Valid);
    assert_eq!(session.stats().resets, 2);
}

#[test]
fn test_silence_resets_and_redetects() {
    let line = MockByteSource::new();
    let mut session = TicSession::with_detection(
        line.clone(),
        MockPulseReader::from_micros(&[PULSE_9600_US; 20]),
        config(Duration::from_millis(30)),
    );
    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(line.baud_rate(), Some(BaudRate::Baud9600));

    // The meter stops mid-dataset
    line.queue_rx_data(&tic_rs::tic::frame::apply_parity(
        b"\x02\nPAPP\t00",
        ParityCheck::Even,
    ));
    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(
        session.state(),
        ParserState::ParsingDataAwaitingDatasetEnd {
            splitter: Splitter::Standard
        }
    );

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(session.status(), LinkStatus::Invalid);

    // Next poll runs the watchdog reinitialisation
    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(session.state(), ParserState::AwaitingFrameStart);
    assert_eq!(session.status(), LinkStatus::Starting);
    assert_eq!(session.stats().resets, 2);

    line.queue_frame(&[papp("00760")], Splitter::Standard, ParityCheck::Even);
    assert_eq!(session.poll(), DecodeOutcome::Produced(papp("00760")));
}

#[test]
fn test_fixed_rate_watchdog_only_resets() {
    let line = MockByteSource::new();
    let mut session = TicSession::with_fixed_rate(
        line.clone(),
        BaudRate::Baud1200,
        config(Duration::from_millis(20)),
    );
    line.queue_rx_data(&tic_rs::tic::frame::apply_parity(b"\x02\nPAPP 0", ParityCheck::Even));
    assert_eq!(session.poll(), DecodeOutcome::Empty);

    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(session.state(), ParserState::AwaitingFrameStart);
    assert_eq!(line.baud_rate(), None);
    assert_eq!(session.baud_rate(), Some(BaudRate::Baud1200));
}

#[test]
fn test_replaced_source_is_retuned() {
    let line = MockByteSource::new();
    let mut session = TicSession::with_detection(
        line.clone(),
        MockPulseReader::from_micros(&[PULSE_1200_US; 20]),
        config(Duration::from_secs(60)),
    );
    assert_eq!(session.poll(), DecodeOutcome::Empty);

    let reopened = MockByteSource::new();
    session.replace_source(reopened.clone());
    assert_eq!(reopened.baud_rate(), None);

    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(reopened.baud_rate(), Some(BaudRate::Baud1200));
}

#[test]
fn test_retune_failure_is_retried() {
    let line = MockByteSource::new();
    line.set_retune_error(TicError::SerialPortError("unplugged".into()));
    let mut session = TicSession::with_detection(
        line.clone(),
        MockPulseReader::from_micros(&[PULSE_9600_US; 20]),
        config(Duration::from_secs(60)),
    );

    let outcome = session.poll();
    assert!(matches!(outcome, DecodeOutcome::Error(TicError::SerialPortError(_))));
    assert_eq!(session.baud_rate(), None);

    assert_eq!(session.poll(), DecodeOutcome::Empty);
    assert_eq!(line.baud_rate(), Some(BaudRate::Baud9600));
}
