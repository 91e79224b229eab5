//! Mock line implementations for testing
//!
//! [`MockByteSource`] stands in for the UART and [`MockPulseReader`] for the
//! raw GPIO line, so the decoder and the baud detector can be exercised
//! without a meter attached.

use crate::error::TicError;
use crate::tic::baud::{BaudRate, PulseReader};
use crate::tic::checksum::Splitter;
use crate::tic::dataset::Dataset;
use crate::tic::decoder::ByteSource;
use crate::tic::frame::{apply_parity, pack_frame};
use crate::tic::parity::ParityCheck;
use crate::tic::session::Retune;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock byte source; clones share the same receive queue.
#[derive(Clone, Default)]
pub struct MockByteSource {
    /// Data to be read (incoming)
    pub rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Error returned by the next read, before any queued byte
    pub next_error: Arc<Mutex<Option<TicError>>>,
    /// Last rate set through [`Retune`]
    pub baud_rate: Arc<Mutex<Option<BaudRate>>>,
    /// Error returned by the next retune
    pub retune_error: Arc<Mutex<Option<TicError>>>,
}

impl MockByteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes, parity bits included.
    pub fn queue_rx_data(&self, data: &[u8]) {
        lock(&self.rx_buffer).extend(data);
    }

    /// Queue a complete frame as a meter would send it.
    pub fn queue_frame(&self, datasets: &[Dataset], splitter: Splitter, parity: ParityCheck) {
        let frame = pack_frame(datasets, splitter);
        self.queue_rx_data(&apply_parity(&frame, parity));
    }

    /// Set an error to be returned on the next read
    pub fn set_next_error(&self, error: TicError) {
        *lock(&self.next_error) = Some(error);
    }

    /// Bytes not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.rx_buffer).len()
    }

    /// Rate last applied by a retune, if any.
    pub fn baud_rate(&self) -> Option<BaudRate> {
        *lock(&self.baud_rate)
    }

    /// Set an error to be returned by the next retune
    pub fn set_retune_error(&self, error: TicError) {
        *lock(&self.retune_error) = Some(error);
    }

    pub fn clear(&self) {
        lock(&self.rx_buffer).clear();
        *lock(&self.next_error) = None;
    }
}

impl Retune for MockByteSource {
    fn set_baud_rate(&mut self, baud_rate: BaudRate) -> Result<(), TicError> {
        if let Some(err) = lock(&self.retune_error).take() {
            return Err(err);
        }
        *lock(&self.baud_rate) = Some(baud_rate);
        Ok(())
    }
}

impl ByteSource for MockByteSource {
    fn read_byte(&mut self) -> Result<Option<u8>, TicError> {
        if let Some(err) = lock(&self.next_error).take() {
            return Err(err);
        }
        Ok(lock(&self.rx_buffer).pop_front())
    }
}

/// Mock raw line replaying a fixed list of low-pulse widths.
#[derive(Debug, Clone, Default)]
pub struct MockPulseReader {
    pulses: VecDeque<Duration>,
    /// Number of `wait_for_idle` calls seen
    pub idle_waits: usize,
}

impl MockPulseReader {
    pub fn new(pulses: impl IntoIterator<Item = Duration>) -> Self {
        MockPulseReader {
            pulses: pulses.into_iter().collect(),
            idle_waits: 0,
        }
    }

    /// Pulses given in microseconds.
    pub fn from_micros(widths: &[u64]) -> Self {
        Self::new(widths.iter().map(|&us| Duration::from_micros(us)))
    }

    /// A meter idling at `rate`: single-bit pulses mixed with wider runs.
    pub fn for_rate(rate: BaudRate, samples: usize) -> Self {
        let bit = rate.bit_period();
        Self::new((0..samples).map(|i| bit * (1 + (i % 3) as u32)))
    }

    pub fn remaining(&self) -> usize {
        self.pulses.len()
    }
}

impl PulseReader for MockPulseReader {
    fn wait_for_idle(&mut self) -> Result<(), TicError> {
        self.idle_waits += 1;
        Ok(())
    }

    fn measure_low_pulse(&mut self) -> Result<Duration, TicError> {
        self.pulses.pop_front().ok_or(TicError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tic::decoder::{DecodeOutcome, TicDecoder};

    #[test]
    fn test_clones_share_queue() {
        let source = MockByteSource::new();
        let handle = source.clone();
        let mut decoder = TicDecoder::new(source);

        assert_eq!(decoder.poll(), DecodeOutcome::Empty);
        let ds = Dataset::new("IINST", "002").unwrap();
        handle.queue_frame(&[ds.clone()], Splitter::Historic, ParityCheck::Even);
        assert_eq!(decoder.poll(), DecodeOutcome::Produced(ds));
        assert_eq!(handle.pending(), 1);
    }

    #[test]
    fn test_injected_error_is_returned_once() {
        let mut source = MockByteSource::new();
        source.queue_rx_data(&[0x82]);
        source.set_next_error(TicError::SerialPortError("unplugged".into()));
        assert!(source.read_byte().is_err());
        assert_eq!(source.read_byte(), Ok(Some(0x82)));
    }

    #[test]
    fn test_pulse_reader_runs_dry() {
        let mut reader = MockPulseReader::from_micros(&[100]);
        assert_eq!(reader.measure_low_pulse(), Ok(Duration::from_micros(100)));
        assert_eq!(reader.measure_low_pulse(), Err(TicError::Timeout));
    }
}
