//! Convergence polling decisions.
//!
//! A convergence check reads a derived model (a graph point, a total, a
//! balance) and reports whether the expected post-condition holds yet. This
//! module decides, without touching a clock, what happens after a check that
//! has not converged: retry after a fixed interval, or give up because the
//! budget is spent.
//!
//! The interval is fixed on purpose. The network folds writes into its
//! aggregates once per block, so the expected delay is roughly constant and
//! independent of load.
//!
//! The async loop that sleeps and re-runs checks lives in `systest-client`.

use std::time::Duration;

/// Default delay between two checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default convergence budget.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of one successful check.
///
/// Both variants carry the value observed during the check so that the
/// poller can hand the last observation back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check<T> {
    /// The post-condition holds.
    Converged(T),
    /// The read succeeded but the post-condition does not hold yet.
    Pending(T),
}

impl<T> Check<T> {
    /// `Converged(value)` if `condition` holds, `Pending(value)` otherwise.
    pub fn when(condition: bool, value: T) -> Self {
        if condition {
            Self::Converged(value)
        } else {
            Self::Pending(value)
        }
    }

    /// Check if the post-condition held.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }

    /// Borrow the observed value.
    pub fn value(&self) -> &T {
        match self {
            Self::Converged(v) | Self::Pending(v) => v,
        }
    }

    /// Take the observed value.
    pub fn into_value(self) -> T {
        match self {
            Self::Converged(v) | Self::Pending(v) => v,
        }
    }
}

/// Record of one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt {
    /// 1-based attempt number.
    pub number: u32,
    /// Time since the poll started, measured after the check returned.
    pub elapsed: Duration,
    /// Whether the check converged.
    pub converged: bool,
}

/// What to do after a pending attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Sleep for `delay`, then check again.
    Retry {
        /// Delay before the next attempt.
        delay: Duration,
    },
    /// The budget is spent; report a timeout.
    Expired,
}

/// Budget and cadence of one convergence poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum time to wait for convergence.
    pub timeout: Duration,
    /// Fixed delay between two checks.
    pub interval: Duration,
}

impl PollPolicy {
    /// Policy with the given budget and the default interval.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the delay between checks.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Decide what follows a pending attempt.
    ///
    /// The delay is clamped to the remaining budget so that a final check
    /// runs right at the deadline; a poll therefore never reports a timeout
    /// before `timeout` has elapsed, nor later than one interval after it
    /// (plus the duration of the last check).
    pub fn after_pending(&self, attempt: &PollAttempt) -> Step {
        if attempt.elapsed >= self.timeout {
            return Step::Expired;
        }
        let remaining = self.timeout - attempt.elapsed;
        Step::Retry {
            delay: self.interval.min(remaining),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_TIMEOUT)
    }
}

/// Expected movement of a numeric reading relative to a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Strictly greater than the baseline.
    Increases,
    /// Strictly less than the baseline.
    Decreases,
    /// Exactly `baseline + delta`.
    ChangesBy(i64),
    /// Exactly this value, whatever the baseline.
    Equals(i64),
}

impl Trend {
    /// Whether `current` satisfies the trend against `baseline`.
    pub fn holds(self, baseline: i64, current: i64) -> bool {
        match self {
            Trend::Increases => current > baseline,
            Trend::Decreases => current < baseline,
            Trend::ChangesBy(delta) => current.checked_sub(baseline) == Some(delta),
            Trend::Equals(value) => current == value,
        }
    }

    /// Classify a reading.
    pub fn check(self, baseline: i64, current: i64) -> Check<i64> {
        Check::when(self.holds(baseline, current), current)
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increases => f.write_str("increases"),
            Trend::Decreases => f.write_str("decreases"),
            Trend::ChangesBy(delta) => write!(f, "changes by {delta}"),
            Trend::Equals(value) => write!(f, "equals {value}"),
        }
    }
}
