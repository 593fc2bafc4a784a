//! Retry combinators for transient DOM states.

use crate::result::{PomError, PomResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Retries granted to an operation that hits a stale element handle.
///
/// The operation runs this many times with staleness swallowed, then once
/// more with every error propagated.
pub const STALE_ELEMENT_RETRIES: u32 = 3;

/// Run `op`, re-running it from scratch while it reports staleness
pub fn retry_on_stale<T, F>(mut op: F) -> PomResult<T>
where
    F: FnMut() -> PomResult<T>,
{
    for attempt in 1..=STALE_ELEMENT_RETRIES {
        match op() {
            Err(PomError::TransientStaleness { element }) => {
                warn!(attempt, %element, "stale element, retrying");
            }
            other => return other,
        }
    }
    op()
}

/// Bounded whole-operation restart policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Create a new policy
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Run `op` up to `policy.max_attempts` times, pausing between attempts.
///
/// Only transient errors (see [`PomError::is_transient`]) trigger a restart;
/// anything else is returned at once. After the last attempt the final
/// transient error is returned, so a transient result always means the budget
/// ran out. `op` receives the 1-based attempt number.
pub fn retry_with_backoff<T, F>(policy: &RetryPolicy, mut op: F) -> PomResult<T>
where
    F: FnMut(u32) -> PomResult<T>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Err(err) if err.is_transient() && attempt < max => {
                info!(attempt, max, error = %err, "transient failure, restarting");
                std::thread::sleep(policy.delay);
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn stale() -> PomError {
        PomError::TransientStaleness {
            element: "e1".into(),
        }
    }

    mod stale_tests {
        use super::*;

        #[test]
        fn test_success_runs_once() {
            let mut calls = 0;
            let out = retry_on_stale(|| {
                calls += 1;
                Ok(5)
            })
            .unwrap();
            assert_eq!(out, 5);
            assert_eq!(calls, 1);
        }

        #[test]
        fn test_recovers_within_budget() {
            let mut calls = 0;
            let out = retry_on_stale(|| {
                calls += 1;
                if calls <= 3 {
                    Err(stale())
                } else {
                    Ok("fresh")
                }
            })
            .unwrap();
            assert_eq!(out, "fresh");
            assert_eq!(calls, 4);
        }

        #[test]
        fn test_final_attempt_propagates() {
            let mut calls = 0;
            let err = retry_on_stale(|| {
                calls += 1;
                Err::<(), _>(stale())
            })
            .unwrap_err();
            assert!(matches!(err, PomError::TransientStaleness { .. }));
            assert_eq!(calls, STALE_ELEMENT_RETRIES + 1);
        }

        #[test]
        fn test_other_errors_not_retried() {
            let mut calls = 0;
            let err = retry_on_stale(|| {
                calls += 1;
                Err::<(), _>(PomError::contract("bad"))
            })
            .unwrap_err();
            assert!(matches!(err, PomError::ContractViolation { .. }));
            assert_eq!(calls, 1);
        }
    }

    mod backoff_tests {
        use super::*;

        const FAST: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(1));

        #[test]
        fn test_restarts_on_transient() {
            let out = retry_with_backoff(&FAST, |attempt| {
                if attempt < 3 {
                    Err(PomError::Timeout { ms: 0 })
                } else {
                    Ok(attempt)
                }
            })
            .unwrap();
            assert_eq!(out, 3);
        }

        #[test]
        fn test_exhaustion_returns_last_transient() {
            let mut seen = Vec::new();
            let err = retry_with_backoff(&FAST, |attempt| {
                seen.push(attempt);
                Err::<(), _>(stale())
            })
            .unwrap_err();
            assert!(err.is_transient());
            assert_eq!(seen, vec![1, 2, 3]);
        }

        #[test]
        fn test_permanent_error_stops_immediately() {
            let mut calls = 0;
            let err = retry_with_backoff(&FAST, |_| {
                calls += 1;
                Err::<(), _>(PomError::contract("bad"))
            })
            .unwrap_err();
            assert!(!err.is_transient());
            assert_eq!(calls, 1);
        }

        #[test]
        fn test_zero_attempts_still_runs_once() {
            let policy = RetryPolicy::new(0, Duration::ZERO);
            let mut calls = 0;
            let _ = retry_with_backoff(&policy, |_| {
                calls += 1;
                Err::<(), _>(stale())
            });
            assert_eq!(calls, 1);
        }
    }
}
