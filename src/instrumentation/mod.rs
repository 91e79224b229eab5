//! Link health and decoder statistics
//!
//! [`LinkMonitor`] turns the stream of decode outcomes into a coarse link
//! status, the kind of signal a status LED or a health endpoint shows:
//! nothing decoded yet, datasets flowing, or errors/silence.

pub mod stats;

pub use stats::{DecoderStats, ErrorType};

use crate::tic::DecodeOutcome;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Coarse link health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkStatus {
    /// Nothing decoded since start or since the last reinitialisation.
    Starting,
    /// The last outcome that mattered was a valid dataset.
    Valid,
    /// The last outcome that mattered was an error, or the line went quiet.
    Invalid,
}

/// Tracks [`LinkStatus`] from decode outcomes.
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    status: LinkStatus,
    /// Session start or last dataset, whichever is later
    last_activity: Instant,
    stale_after: Duration,
}

impl LinkMonitor {
    /// `stale_after` is how long without a dataset turns the link `Invalid`.
    pub fn new(stale_after: Duration) -> Self {
        LinkMonitor {
            status: LinkStatus::Starting,
            last_activity: Instant::now(),
            stale_after,
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    /// Updates the status from one poll outcome and returns the new status.
    ///
    /// `Empty` only matters through staleness.
    pub fn observe(&mut self, outcome: &DecodeOutcome) -> LinkStatus {
        let previous = self.status;
        match outcome {
            DecodeOutcome::Produced(_) => {
                self.status = LinkStatus::Valid;
                self.last_activity = Instant::now();
            }
            DecodeOutcome::Error(_) => self.status = LinkStatus::Invalid,
            DecodeOutcome::Empty => {
                if self.is_stale() {
                    self.status = LinkStatus::Invalid;
                }
            }
        }
        if previous != self.status {
            log::info!("Link status {previous:?} -> {:?}", self.status);
        }
        self.status
    }

    /// Forces `Invalid`, e.g. after a failed detection.
    pub fn mark_invalid(&mut self) {
        self.status = LinkStatus::Invalid;
    }

    /// Back to `Starting`, for a fresh session.
    pub fn restart(&mut self) {
        self.status = LinkStatus::Starting;
        self.last_activity = Instant::now();
    }

    /// True when no dataset arrived within `stale_after` of the last one, or
    /// of the session start if none arrived yet.
    pub fn is_stale(&self) -> bool {
        self.last_activity.elapsed() > self.stale_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TicError;
    use crate::tic::Dataset;

    #[test]
    fn test_status_transitions() {
        let mut monitor = LinkMonitor::new(Duration::from_secs(60));
        assert_eq!(monitor.observe(&DecodeOutcome::Empty), LinkStatus::Starting);

        let ds = Dataset::new("PAPP", "00750").unwrap();
        assert_eq!(monitor.observe(&DecodeOutcome::Produced(ds)), LinkStatus::Valid);
        assert_eq!(monitor.observe(&DecodeOutcome::Empty), LinkStatus::Valid);
        assert_eq!(
            monitor.observe(&DecodeOutcome::Error(TicError::ParityError(0x41))),
            LinkStatus::Invalid
        );

        monitor.restart();
        assert_eq!(monitor.status(), LinkStatus::Starting);
    }

    #[test]
    fn test_silence_turns_invalid() {
        let mut monitor = LinkMonitor::new(Duration::ZERO);
        let ds = Dataset::new("IINST", "002").unwrap();
        monitor.observe(&DecodeOutcome::Produced(ds));
        std::thread::sleep(Duration::from_millis(2));
        assert!(monitor.is_stale());
        assert_eq!(monitor.observe(&DecodeOutcome::Empty), LinkStatus::Invalid);
    }

    #[test]
    fn test_silent_start_turns_invalid() {
        let mut monitor = LinkMonitor::new(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(3));
        assert!(monitor.is_stale());
        assert_eq!(monitor.observe(&DecodeOutcome::Empty), LinkStatus::Invalid);

        monitor.restart();
        assert_eq!(monitor.status(), LinkStatus::Starting);
    }
}
