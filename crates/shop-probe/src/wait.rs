//! Wait Mechanisms
//!
//! Bounded poll-and-yield waiting for asynchronous UI transitions.
//!
//! A wait evaluates its condition at least once, then sleeps for the poll
//! interval between evaluations until the condition holds or the deadline
//! passes. Sleeping yields to the runtime, so no thread is parked. Errors
//! raised by the condition itself abort the wait immediately.

use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was evaluated
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITING
// =============================================================================

/// Wait until `condition` resolves to `true`.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] when the deadline passes first, or the
/// condition's own error.
pub async fn wait_for<F, Fut>(
    mut condition: F,
    options: &WaitOptions,
    waited_for: &str,
) -> ProbeResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut polls = 0_u32;

    loop {
        polls = polls.saturating_add(1);
        if condition().await? {
            debug!(waited_for, polls, elapsed_ms = start.elapsed().as_millis() as u64, "wait settled");
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                polls,
                waited_for: waited_for.to_string(),
            });
        }

        if Instant::now() >= deadline {
            warn!(waited_for, polls, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(ProbeError::Timeout {
                ms: options.timeout_ms,
                waited_for: waited_for.to_string(),
            });
        }

        tokio::time::sleep(options.poll_interval()).await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
