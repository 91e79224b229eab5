//! # Baud Rate Detection
//!
//! Meters talk either 1200 baud (historic mode) or 9600 baud (standard mode).
//! Before the UART is attached, the detector samples the narrowest low pulse
//! on the raw line: wider pulses are runs of several zero bits, so the
//! narrowest one is a single bit period (833 µs or 104 µs).
//!
//! Detection blocks until the meter has produced enough transitions. It
//! belongs to start-up and re-initialisation only; the steady-state decoder
//! never sees a [`PulseReader`].

use crate::constants::{
    TIC_DETECTION_SAMPLES, TIC_PULSE_1200_MAX_US, TIC_PULSE_1200_MIN_US, TIC_PULSE_9600_MAX_US,
    TIC_PULSE_9600_MIN_US,
};
use crate::error::TicError;
use crate::tic::checksum::Splitter;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Line rates used by TIC meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BaudRate {
    Baud1200,
    Baud9600,
}

impl BaudRate {
    pub const ALL_RATES: [BaudRate; 2] = [BaudRate::Baud1200, BaudRate::Baud9600];

    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::Baud1200 => 1200,
            BaudRate::Baud9600 => 9600,
        }
    }

    /// Nominal duration of one bit on the line.
    pub fn bit_period(self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.as_u32()))
    }

    /// Splitter the meter normally uses at this rate.
    pub fn usual_splitter(self) -> Splitter {
        match self {
            BaudRate::Baud1200 => Splitter::Historic,
            BaudRate::Baud9600 => Splitter::Standard,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = TicError;

    fn try_from(rate: u32) -> Result<Self, Self::Error> {
        match rate {
            1200 => Ok(BaudRate::Baud1200),
            9600 => Ok(BaudRate::Baud9600),
            other => Err(TicError::UnsupportedBaudRate(other)),
        }
    }
}

impl FromStr for BaudRate {
    type Err = TicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate: u32 = s
            .trim()
            .parse()
            .map_err(|_| TicError::UnsupportedBaudRate(0))?;
        BaudRate::try_from(rate)
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Blocking access to the raw TIC line, before UART framing.
pub trait PulseReader {
    /// Blocks until the line is at its idle (high) level.
    fn wait_for_idle(&mut self) -> Result<(), TicError>;

    /// Blocks until the line goes low and returns how long it stays low.
    fn measure_low_pulse(&mut self) -> Result<Duration, TicError>;
}

impl<R: PulseReader + ?Sized> PulseReader for &mut R {
    fn wait_for_idle(&mut self) -> Result<(), TicError> {
        (**self).wait_for_idle()
    }

    fn measure_low_pulse(&mut self) -> Result<Duration, TicError> {
        (**self).measure_low_pulse()
    }
}

/// Detector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Low pulses measured before classifying.
    pub samples: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            samples: TIC_DETECTION_SAMPLES,
        }
    }
}

/// Measures the line and classifies its bit rate.
#[derive(Debug, Clone, Default)]
pub struct BaudDetector {
    config: DetectorConfig,
}

impl BaudDetector {
    pub fn new(config: DetectorConfig) -> Self {
        BaudDetector { config }
    }

    /// Samples `config.samples` low pulses and classifies the narrowest one.
    pub fn detect<R: PulseReader + ?Sized>(&self, reader: &mut R) -> Result<BaudRate, TicError> {
        let mut narrowest = Duration::MAX;
        for i in 0..self.config.samples {
            reader.wait_for_idle()?;
            let width = reader.measure_low_pulse()?;
            log::trace!("Low pulse {i}: {} us", width.as_micros());
            narrowest = narrowest.min(width);
        }

        let result = classify_pulse(narrowest);
        match &result {
            Ok(rate) => log::info!("Detected baudrate of {rate}"),
            Err(err) => log::error!("{err}"),
        }
        result
    }
}

/// Maps the narrowest low pulse to a baud rate.
pub fn classify_pulse(narrowest: Duration) -> Result<BaudRate, TicError> {
    let us = u64::try_from(narrowest.as_micros()).unwrap_or(u64::MAX);
    if (TIC_PULSE_1200_MIN_US..=TIC_PULSE_1200_MAX_US).contains(&us) {
        Ok(BaudRate::Baud1200)
    } else if (TIC_PULSE_9600_MIN_US..=TIC_PULSE_9600_MAX_US).contains(&us) {
        Ok(BaudRate::Baud9600)
    } else {
        Err(TicError::DetectionFailed { min_pulse_us: us })
    }
}

/// Uses `rate_hint` verbatim when given, otherwise runs detection on `reader`.
pub fn detect_or_configure<R: PulseReader + ?Sized>(
    rate_hint: Option<BaudRate>,
    reader: &mut R,
) -> Result<BaudRate, TicError> {
    match rate_hint {
        Some(rate) => {
            log::info!("Using baudrate of {rate}");
            Ok(rate)
        }
        None => BaudDetector::default().detect(reader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_windows() {
        assert_eq!(classify_pulse(Duration::from_micros(666)), Ok(BaudRate::Baud1200));
        assert_eq!(classify_pulse(Duration::from_micros(1000)), Ok(BaudRate::Baud1200));
        assert_eq!(classify_pulse(Duration::from_micros(83)), Ok(BaudRate::Baud9600));
        assert_eq!(classify_pulse(Duration::from_micros(125)), Ok(BaudRate::Baud9600));
        assert_eq!(
            classify_pulse(Duration::from_micros(126)),
            Err(TicError::DetectionFailed { min_pulse_us: 126 })
        );
        assert_eq!(
            classify_pulse(Duration::from_micros(1001)),
            Err(TicError::DetectionFailed { min_pulse_us: 1001 })
        );
        assert!(classify_pulse(Duration::MAX).is_err());
    }

    #[test]
    fn test_rate_conversions() {
        assert_eq!(BaudRate::try_from(1200), Ok(BaudRate::Baud1200));
        assert_eq!(BaudRate::try_from(2400), Err(TicError::UnsupportedBaudRate(2400)));
        assert_eq!("9600".parse::<BaudRate>(), Ok(BaudRate::Baud9600));
        assert!("fast".parse::<BaudRate>().is_err());
        assert_eq!(BaudRate::Baud9600.to_string(), "9600");
    }

    #[test]
    fn test_bit_periods_fall_in_their_windows() {
        for rate in BaudRate::ALL_RATES {
            assert_eq!(classify_pulse(rate.bit_period()), Ok(rate));
        }
        assert_eq!(BaudRate::Baud1200.usual_splitter(), Splitter::Historic);
    }
}
