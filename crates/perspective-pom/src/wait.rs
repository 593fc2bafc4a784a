//! Synchronous poll loop used by every blocking resolution.
//!
//! A check runs immediately and then again after each poll interval until it
//! yields a value or the timeout elapses. Overrun past the deadline is bounded
//! by one interval plus the duration of one check. A zero timeout performs
//! exactly one check.

use crate::result::{PomError, PomResult};
use std::time::{Duration, Instant};
use tracing::trace;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default resolution timeout (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default poll interval (500ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up once this much time has elapsed
    pub timeout: Duration,
    /// Minimum spacing between checks
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Blocking poll loop over a fallible check
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options this waiter polls with
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `check` until it yields `Some`.
    ///
    /// Errors returned by the check end the loop immediately. Callers that
    /// want to tolerate a failure kind map it to `Ok(None)` inside the check.
    pub fn poll<T, F>(&self, mut check: F) -> PomResult<T>
    where
        F: FnMut() -> PomResult<Option<T>>,
    {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if let Some(value) = check()? {
                return Ok(value);
            }
            let elapsed = start.elapsed();
            if elapsed >= self.options.timeout {
                trace!(attempts, elapsed_ms = elapsed.as_millis() as u64, "poll timed out");
                return Err(PomError::Timeout {
                    ms: self.options.timeout_ms(),
                });
            }
            trace!(attempts, "condition not met, sleeping");
            std::thread::sleep(self.options.poll_interval);
        }
    }
}

/// Fixed settle sleep after an interaction
pub fn wait_some_time(duration: Duration) {
    if !duration.is_zero() {
        trace!(ms = duration.as_millis() as u64, "settling");
        std::thread::sleep(duration);
    }
}
