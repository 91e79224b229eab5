//! # TIC Session
//!
//! [`TicSession`] owns a [`TicDecoder`] together with what it takes to bring
//! the link back after trouble: an optional [`PulseReader`] for baud rate
//! detection, a [`LinkMonitor`] acting as watchdog, and a retry delay for
//! failed detections.
//!
//! ## Reinitialisation
//!
//! A session (re)initialises on the first poll, after
//! [`replace_source`](TicSession::replace_source), and whenever no dataset
//! arrived for `stale_after`. Reinitialising resets the decoder and, when a
//! pulse reader is present, runs detection again and retunes the source.
//! A failed detection is returned as `Error(DetectionFailed)` and retried
//! once `retry_after` has passed; polls in between return `Empty`.
//!
//! ```rust
//! use tic_rs::tic::mock::{MockByteSource, MockPulseReader};
//! use tic_rs::tic::session::{SessionConfig, TicSession};
//! use tic_rs::tic::{BaudRate, DecodeOutcome};
//!
//! let line = MockByteSource::new();
//! let pulses = MockPulseReader::for_rate(BaudRate::Baud9600, 10);
//! let mut session = TicSession::with_detection(line.clone(), pulses, SessionConfig::default());
//!
//! assert_eq!(session.poll(), DecodeOutcome::Empty);
//! assert_eq!(session.baud_rate(), Some(BaudRate::Baud9600));
//! assert_eq!(line.baud_rate(), Some(BaudRate::Baud9600));
//! ```

use crate::error::TicError;
use crate::instrumentation::{DecoderStats, LinkMonitor, LinkStatus};
use crate::tic::baud::{BaudDetector, BaudRate, PulseReader};
use crate::tic::decoder::{ByteSource, DecodeOutcome, DecoderConfig, TicDecoder};
use crate::tic::parser::ParserState;
use std::time::{Duration, Instant};

/// A byte source whose line rate can be changed in place.
pub trait Retune {
    fn set_baud_rate(&mut self, baud_rate: BaudRate) -> Result<(), TicError>;
}

impl<S: Retune + ?Sized> Retune for &mut S {
    fn set_baud_rate(&mut self, baud_rate: BaudRate) -> Result<(), TicError> {
        (**self).set_baud_rate(baud_rate)
    }
}

/// Timing of a [`TicSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub decoder: DecoderConfig,
    /// Silence after which the session reinitialises.
    pub stale_after: Duration,
    /// Delay before retrying a failed detection.
    pub retry_after: Duration,
    pub detector: BaudDetector,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            decoder: DecoderConfig::default(),
            stale_after: Duration::from_secs(10),
            retry_after: Duration::from_secs(5),
            detector: BaudDetector::default(),
        }
    }
}

/// A decoder that reinitialises itself when the link goes bad.
pub struct TicSession<S> {
    decoder: TicDecoder<S>,
    monitor: LinkMonitor,
    pulses: Option<Box<dyn PulseReader>>,
    config: SessionConfig,
    baud_rate: Option<BaudRate>,
    needs_init: bool,
    next_attempt: Option<Instant>,
}

impl<S: ByteSource + Retune> TicSession<S> {
    /// A session on a line whose rate is known. Reinitialising only resets
    /// the decoder.
    pub fn with_fixed_rate(source: S, baud_rate: BaudRate, config: SessionConfig) -> Self {
        Self::build(source, None, Some(baud_rate), config)
    }

    /// A session that detects the line rate from `pulses` before decoding,
    /// and again on every reinitialisation.
    pub fn with_detection(
        source: S,
        pulses: impl PulseReader + 'static,
        config: SessionConfig,
    ) -> Self {
        Self::build(source, Some(Box::new(pulses)), None, config)
    }

    fn build(
        source: S,
        pulses: Option<Box<dyn PulseReader>>,
        baud_rate: Option<BaudRate>,
        config: SessionConfig,
    ) -> Self {
        TicSession {
            decoder: TicDecoder::with_config(source, config.decoder),
            monitor: LinkMonitor::new(config.stale_after),
            pulses,
            config,
            baud_rate,
            needs_init: true,
            next_attempt: None,
        }
    }

    /// One non-blocking decode pass, preceded by a reinitialisation when one
    /// is due. Detection itself blocks while it samples the line.
    pub fn poll(&mut self) -> DecodeOutcome {
        if self.needs_init {
            if self.next_attempt.map_or(false, |at| Instant::now() < at) {
                return DecodeOutcome::Empty;
            }
            if let Err(err) = self.initialize() {
                self.monitor.mark_invalid();
                self.next_attempt = Some(Instant::now() + self.config.retry_after);
                log::warn!(
                    "Initialisation failed: {err}, retrying in {:?}",
                    self.config.retry_after
                );
                return DecodeOutcome::Error(err);
            }
        }

        let outcome = self.decoder.poll();
        let status = self.monitor.observe(&outcome);
        if status == LinkStatus::Invalid && self.monitor.is_stale() {
            log::warn!(
                "No dataset for {:?} (parser in {}), reinitialising",
                self.config.stale_after,
                self.decoder.state().name()
            );
            self.needs_init = true;
        }
        outcome
    }

    fn initialize(&mut self) -> Result<(), TicError> {
        self.decoder.reset();
        if let Some(pulses) = self.pulses.as_mut() {
            let rate = self.config.detector.detect(pulses.as_mut())?;
            self.decoder.source_mut().set_baud_rate(rate)?;
            self.baud_rate = Some(rate);
        }
        self.monitor.restart();
        self.needs_init = false;
        self.next_attempt = None;
        Ok(())
    }

    /// Swaps the byte source, e.g. after reopening the port, and schedules a
    /// reinitialisation for the next poll.
    pub fn replace_source(&mut self, source: S) -> S {
        self.needs_init = true;
        self.next_attempt = None;
        self.decoder.replace_source(source)
    }
}

impl<S> TicSession<S> {
    /// Rate in use, `None` until a detection succeeded.
    pub fn baud_rate(&self) -> Option<BaudRate> {
        self.baud_rate
    }

    pub fn status(&self) -> LinkStatus {
        self.monitor.status()
    }

    pub fn state(&self) -> ParserState {
        self.decoder.state()
    }

    pub fn stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.decoder.source_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tic::mock::{MockByteSource, MockPulseReader};

    #[test]
    fn test_fixed_rate_never_retunes() {
        let line = MockByteSource::new();
        let mut session =
            TicSession::with_fixed_rate(line.clone(), BaudRate::Baud1200, SessionConfig::default());

        assert_eq!(session.poll(), DecodeOutcome::Empty);
        assert_eq!(session.baud_rate(), Some(BaudRate::Baud1200));
        assert_eq!(line.baud_rate(), None);
        assert_eq!(session.status(), LinkStatus::Starting);
    }

    #[test]
    fn test_retry_waits_for_timer() {
        let config = SessionConfig {
            retry_after: Duration::from_secs(60),
            ..SessionConfig::default()
        };
        let pulses = MockPulseReader::from_micros(&[300; 10]);
        let mut session = TicSession::with_detection(MockByteSource::new(), pulses, config);

        assert_eq!(
            session.poll(),
            DecodeOutcome::Error(TicError::DetectionFailed { min_pulse_us: 300 })
        );
        assert_eq!(session.status(), LinkStatus::Invalid);
        // Not due yet
        assert_eq!(session.poll(), DecodeOutcome::Empty);
        assert_eq!(session.baud_rate(), None);
    }
}
