//! # Enhanced Logging Utilities
//!
//! Logging patterns for the TIC decoder and its polling loop: rate limiting,
//! hex dumps of dataset buffers and optional tracing spans.
//!
//! ## Usage
//!
//! ```rust
//! use tic_rs::util::logging::{LogThrottle, log_dataset_hex};
//!
//! // A noisy line can produce hundreds of parity errors per second
//! let mut throttle = LogThrottle::new(1000, 5);
//! if throttle.allow() {
//!     log::warn!("parity error");
//! }
//!
//! log_dataset_hex("Dataset", b"PAPP 00750 -");
//! ```

use std::time::Instant;

/// Throttling structure for rate-limiting log messages
#[derive(Debug)]
pub struct LogThrottle {
    /// Time window for throttling (in milliseconds)
    window_ms: u64,
    /// Maximum messages allowed per window
    cap: u32,
    /// Current message count in window
    count: u32,
    /// Messages refused since the last window rollover
    suppressed: u32,
    /// Start time of current window
    t0: Instant,
}

impl LogThrottle {
    /// Create new throttle with time window and message cap
    ///
    /// # Arguments
    /// * `window_ms` - Time window in milliseconds
    /// * `cap` - Maximum messages allowed per window
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            suppressed: 0,
            t0: Instant::now(),
        }
    }

    /// Check if logging is allowed (resets counter after window expires)
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.t0).as_millis() as u64;

        if elapsed_ms > self.window_ms {
            if self.suppressed > 0 {
                log::debug!("{} log messages suppressed", self.suppressed);
            }
            self.t0 = now;
            self.count = 0;
            self.suppressed = 0;
        }

        self.count += 1;
        let allowed = self.count <= self.cap;
        if !allowed {
            self.suppressed += 1;
        }
        allowed
    }

    /// Messages refused in the current window
    pub fn suppressed(&self) -> u32 {
        self.suppressed
    }

    /// Reset the throttle (start new window immediately)
    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
        self.suppressed = 0;
    }
}

/// Log a dataset buffer in hex and printable form at debug level
pub fn log_dataset_hex(prefix: &str, data: &[u8]) {
    log::debug!(
        target: "tic::dataset",
        "{prefix}: {} [{}]",
        crate::util::hex::format_dataset_bytes(data),
        crate::util::hex::format_hex_compact(data)
    );
}

/// Create a tracing span around one decoder drain pass
#[cfg(feature = "tracing")]
pub fn span_decode_pass(state: &str) -> tracing::span::EnteredSpan {
    tracing::debug_span!("tic_decode_pass", state = state).entered()
}

/// Fallback span creation when tracing is not available
#[cfg(not(feature = "tracing"))]
pub fn span_decode_pass(_state: &str) {}

/// Log a warning with throttling
#[macro_export]
macro_rules! log_warn_throttled {
    ($throttle:expr, $($arg:tt)*) => {
        if $throttle.allow() {
            log::warn!($($arg)*);
        }
    };
}
