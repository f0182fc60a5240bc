//! Convergence polling.
//!
//! Writes to the network land in its derived models (graphs, totals,
//! balances) a few blocks later. [`poll_immediately`] re-runs a check until
//! it converges, the budget runs out, or the check fails outright.
//!
//! The check receives the value it observed on the previous attempt, so a
//! condition such as "the total moved by exactly one token since the last
//! read" is expressed without mutating captured state.
//!
//! ```ignore
//! let baseline = client.total(TotalMetric::TotalStaked).await?;
//! ops.stake(ProviderType::Blobber, &blobber_id, ZCN).await?;
//!
//! let staked = poll_immediately(PollPolicy::default(), |_| async {
//!     let now = client.total(TotalMetric::TotalStaked).await?;
//!     Ok::<_, ClientError>(Check::when(now == baseline + ZCN, now))
//! })
//! .await?;
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use systest_core::{Check, PollAttempt, PollPolicy, Step};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// A successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converged<T> {
    /// Value observed by the converging check.
    pub value: T,
    /// Number of checks run, including the converging one.
    pub attempts: u32,
    /// Time from the start of the poll to convergence.
    pub elapsed: Duration,
}

/// A failed poll.
#[derive(Debug)]
pub enum WaitError<T, E> {
    /// The budget ran out while the check was still pending.
    Timeout {
        /// Configured budget.
        timeout: Duration,
        /// Number of checks run.
        attempts: u32,
        /// Value observed by the last check.
        last_observed: Option<T>,
    },
    /// The check failed outright; no further attempts were made.
    Fatal {
        /// Attempt that failed.
        attempt: u32,
        /// The check's error.
        source: E,
    },
}

impl<T, E> WaitError<T, E> {
    /// Whether the poll ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }
}

impl<T, E: fmt::Display> fmt::Display for WaitError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Timeout {
                timeout, attempts, ..
            } => write!(
                f,
                "did not converge within {:?} ({} attempts)",
                timeout, attempts
            ),
            WaitError::Fatal { attempt, source } => {
                write!(f, "fatal error on attempt {}: {}", attempt, source)
            }
        }
    }
}

impl<T, E> StdError for WaitError<T, E>
where
    T: fmt::Debug,
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            WaitError::Fatal { source, .. } => Some(source),
            WaitError::Timeout { .. } => None,
        }
    }
}

/// Reduce a finished poll to whether it converged.
///
/// A timeout is `Ok(false)`. A fatal error stays an error, so a failed
/// request is never read as a condition that did not hold.
pub fn converged_within<T, E>(
    result: Result<Converged<T>, WaitError<T, E>>,
) -> Result<bool, WaitError<T, E>> {
    match result {
        Ok(_) => Ok(true),
        Err(WaitError::Timeout { .. }) => Ok(false),
        Err(fatal) => Err(fatal),
    }
}

/// Run `check` until it converges.
///
/// The first check runs immediately. After each pending check the poller
/// sleeps for the policy's interval (clamped to what is left of the budget)
/// and checks again. A check returning `Err` ends the poll at once.
pub async fn poll_immediately<T, E, F, Fut>(
    policy: PollPolicy,
    mut check: F,
) -> Result<Converged<T>, WaitError<T, E>>
where
    T: Clone + fmt::Debug,
    E: fmt::Display,
    F: FnMut(Option<T>) -> Fut,
    Fut: Future<Output = Result<Check<T>, E>>,
{
    let start = Instant::now();
    let mut last_observed: Option<T> = None;
    let mut number = 0u32;

    loop {
        number += 1;
        let result = check(last_observed.clone()).await;
        let elapsed = start.elapsed();

        let value = match result {
            Err(source) => {
                warn!("poll aborted on attempt {}: {}", number, source);
                return Err(WaitError::Fatal {
                    attempt: number,
                    source,
                });
            }
            Ok(Check::Converged(value)) => {
                info!("converged after {} attempts in {:?}", number, elapsed);
                return Ok(Converged {
                    value,
                    attempts: number,
                    elapsed,
                });
            }
            Ok(Check::Pending(value)) => value,
        };

        debug!("attempt {} pending at {:?}: {:?}", number, elapsed, value);
        last_observed = Some(value);

        let attempt = PollAttempt {
            number,
            elapsed,
            converged: false,
        };
        match policy.after_pending(&attempt) {
            Step::Retry { delay } => sleep(delay).await,
            Step::Expired => {
                warn!(
                    "no convergence within {:?} after {} attempts, last observed {:?}",
                    policy.timeout, number, last_observed
                );
                return Err(WaitError::Timeout {
                    timeout: policy.timeout,
                    attempts: number,
                    last_observed,
                });
            }
        }
    }
}
