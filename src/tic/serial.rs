//! # TIC Serial Link
//!
//! Wraps a serial port as a non-blocking [`ByteSource`]. The port is opened as
//! 8 data bits without parity so the meter's 7E1 parity bit reaches the
//! decoder, which checks it in software.

use crate::error::TicError;
use crate::tic::baud::BaudRate;
use crate::tic::decoder::ByteSource;
use crate::tic::session::Retune;
use std::collections::VecDeque;
use std::io::Read;
use std::time::Duration;
use tokio_serial::SerialPort;

/// Configuration for the serial connection.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: BaudRate,
    /// Upper bound for one underlying read; reads are only issued when bytes
    /// are already pending, so this is rarely reached.
    pub read_timeout: Duration,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>, baud_rate: BaudRate) -> Self {
        SerialConfig {
            port: port.into(),
            baud_rate,
            read_timeout: Duration::from_millis(10),
        }
    }
}

/// Serial port exposed as a [`ByteSource`].
pub struct SerialByteSource {
    port: Box<dyn SerialPort>,
    pending: VecDeque<u8>,
    config: SerialConfig,
}

impl SerialByteSource {
    /// Opens the port described by `config`.
    pub fn open(config: SerialConfig) -> Result<Self, TicError> {
        let port = tokio_serial::new(config.port.as_str(), config.baud_rate.as_u32())
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| TicError::SerialPortError(format!("{}: {e}", config.port)))?;

        log::info!("Opened {} at {} baud", config.port, config.baud_rate);
        Ok(SerialByteSource {
            port,
            pending: VecDeque::with_capacity(64),
            config,
        })
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Switches the open port to another rate, dropping anything not yet read.
    pub fn set_baud_rate(&mut self, baud_rate: BaudRate) -> Result<(), TicError> {
        self.port.set_baud_rate(baud_rate.as_u32())?;
        self.pending.clear();
        self.config.baud_rate = baud_rate;
        log::info!("Switched {} to {} baud", self.config.port, baud_rate);
        Ok(())
    }

    fn fill(&mut self) -> Result<(), TicError> {
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(());
        }

        let mut chunk = [0u8; 64];
        let want = available.min(chunk.len());
        match self.port.read(&mut chunk[..want]) {
            Ok(n) => {
                self.pending.extend(&chunk[..n]);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Retune for SerialByteSource {
    fn set_baud_rate(&mut self, baud_rate: BaudRate) -> Result<(), TicError> {
        SerialByteSource::set_baud_rate(self, baud_rate)
    }
}

impl ByteSource for SerialByteSource {
    fn read_byte(&mut self) -> Result<Option<u8>, TicError> {
        if self.pending.is_empty() {
            self.fill()?;
        }
        Ok(self.pending.pop_front())
    }
}
