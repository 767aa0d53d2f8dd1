//! Rolling request counter for rate-limit awareness.
//!
//! The EIA API allows 5,000 requests per hour. The counter here is advisory:
//! it warns at 80% usage but never blocks a call, since the upstream server
//! enforces the real limit.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Requests allowed per window by the upstream API.
pub const RATE_LIMIT: u32 = 5000;

/// Usage at which a warning is emitted (80% of [`RATE_LIMIT`]).
pub const RATE_LIMIT_WARNING: u32 = 4000;

/// Length of the rolling window.
pub const RATE_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Counter state for the current window.
#[derive(Debug, Clone, Copy)]
pub struct RateState {
    /// Requests issued since `window_start`
    pub request_count: u32,
    /// When the current window began
    pub window_start: Instant,
}

impl RateState {
    /// Fresh state starting now.
    pub fn new() -> Self {
        Self {
            request_count: 0,
            window_start: Instant::now(),
        }
    }
}

impl Default for RateState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateStatus {
    /// Below the warning threshold
    Normal {
        /// Requests used in this window
        used: u32,
    },
    /// At or above the warning threshold
    Approaching {
        /// Requests used in this window
        used: u32,
        /// Requests left before the upstream limit
        remaining: u32,
    },
}

impl RateStatus {
    /// Returns true if the warning threshold has been reached.
    pub fn is_warning(&self) -> bool {
        matches!(self, RateStatus::Approaching { .. })
    }
}

/// Thread-safe rolling request counter.
///
/// The window resets lazily: only [`check`](Self::check) looks at the clock.
#[derive(Debug, Default)]
pub struct RateTracker {
    state: Mutex<RateState>,
}

impl RateTracker {
    /// Creates a tracker with an empty window starting now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker from existing state.
    pub fn from_state(state: RateState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Resets the window if it has expired and reports current usage.
    pub fn check(&self) -> RateStatus {
        self.check_at(Instant::now())
    }

    /// [`check`](Self::check) against an explicit clock reading.
    pub fn check_at(&self, now: Instant) -> RateStatus {
        let mut state = self.state.lock();

        if now.saturating_duration_since(state.window_start) >= RATE_WINDOW {
            tracing::debug!(
                previous = state.request_count,
                "resetting EIA rate limit counter"
            );
            state.request_count = 0;
            state.window_start = now;
        }

        let used = state.request_count;
        if used >= RATE_LIMIT_WARNING {
            let remaining = RATE_LIMIT.saturating_sub(used);
            tracing::warn!(
                used,
                limit = RATE_LIMIT,
                remaining,
                "Approaching EIA API rate limit: {used}/{RATE_LIMIT} requests used, \
                 {remaining} requests remaining this hour"
            );
            RateStatus::Approaching { used, remaining }
        } else {
            RateStatus::Normal { used }
        }
    }

    /// Counts one issued request and returns the new total.
    pub fn record_attempt(&self) -> u32 {
        let mut state = self.state.lock();
        state.request_count = state.request_count.saturating_add(1);
        state.request_count
    }

    /// Requests counted in the current window.
    pub fn request_count(&self) -> u32 {
        self.state.lock().request_count
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> RateState {
        *self.state.lock()
    }
}
