//! # Raspberry Pi Line Sampling
//!
//! [`RppalPulseReader`] reads the TIC line through a GPIO input (usually the
//! UART RX pin before the UART is attached) and times low pulses by polling.
//! Polling keeps the implementation free of interrupt setup; at 9600 baud a
//! bit lasts about 104 µs, which a Pi 4/5 samples comfortably.

use crate::error::TicError;
use crate::tic::baud::PulseReader;
use rppal::gpio::{Gpio, InputPin, Level};
use std::time::{Duration, Instant};

/// GPIO-backed [`PulseReader`].
pub struct RppalPulseReader {
    pin: InputPin,
    stall_timeout: Duration,
}

impl RppalPulseReader {
    /// Claims BCM pin `bcm_pin` as an input with pull-up (the line idles high).
    ///
    /// `stall_timeout` bounds every wait for a level change.
    pub fn open(bcm_pin: u8, stall_timeout: Duration) -> Result<Self, TicError> {
        let gpio = Gpio::new().map_err(|e| TicError::Gpio(e.to_string()))?;
        let pin = gpio
            .get(bcm_pin)
            .map_err(|e| TicError::Gpio(format!("GPIO{bcm_pin}: {e}")))?
            .into_input_pullup();

        log::debug!("Sampling TIC line on GPIO{bcm_pin}");
        Ok(RppalPulseReader { pin, stall_timeout })
    }

    fn wait_for_level(&self, level: Level) -> Result<Instant, TicError> {
        let start = Instant::now();
        loop {
            if self.pin.read() == level {
                return Ok(Instant::now());
            }
            if start.elapsed() > self.stall_timeout {
                return Err(TicError::Timeout);
            }
            std::hint::spin_loop();
        }
    }
}

impl PulseReader for RppalPulseReader {
    fn wait_for_idle(&mut self) -> Result<(), TicError> {
        self.wait_for_level(Level::High).map(|_| ())
    }

    fn measure_low_pulse(&mut self) -> Result<Duration, TicError> {
        let fell = self.wait_for_level(Level::Low)?;
        let rose = self.wait_for_level(Level::High)?;
        Ok(rose.duration_since(fell))
    }
}
