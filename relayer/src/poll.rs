//! Submit-and-poll primitive shared by every relay stage.
//!
//! A stage repeatedly performs an idempotent action against an external
//! system and classifies each response. Transport failures and pending
//! responses are retried after a fixed delay; an authoritative rejection or
//! a response that no longer matches the expected schema stops the relay.

use std::future::Future;
use std::num::NonZeroU64;
use std::time::Duration;

use error_stack::{Context, Report, Result};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("request was rejected: {0}")]
    Rejected(String),
    #[error("response did not match the expected schema")]
    Protocol,
    #[error("no terminal response after {0} attempts")]
    Timeout(u64),
}

/// How a stage reads a single response from the external system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification<T> {
    /// The stage is complete; carries the extracted output.
    Terminal(T),
    /// The external system has not converged yet; retry after the delay.
    Pending(String),
    /// An authoritative no. Retrying cannot change the outcome.
    Rejected(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<NonZeroU64>,
}

impl PollPolicy {
    /// Retry until the external system converges. This is the default for
    /// every stage: the relay blocks until an operator intervenes.
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub const fn bounded(interval: Duration, max_attempts: NonZeroU64) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Runs `action` until `classify` recognizes a terminal response.
///
/// The action must be safe to execute more than once: no attempt count or
/// nonce is carried across retries, and the external systems are expected to
/// converge to the same terminal state on duplicate submission.
pub async fn submit_until_terminal<F, Fut, Raw, E, C, T>(
    action: F,
    classify: C,
    policy: PollPolicy,
) -> Result<T, Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Raw, E>>,
    E: Context,
    C: Fn(Raw) -> Result<Classification<T>, Error>,
{
    let mut attempts: u64 = 0;

    loop {
        match action().await {
            Ok(raw) => match classify(raw)? {
                Classification::Terminal(value) => return Ok(value),
                Classification::Pending(reason) => {
                    debug!(%reason, "waiting for terminal response");
                }
                Classification::Rejected(reason) => {
                    return Err(Report::new(Error::Rejected(reason)));
                }
            },
            Err(err) => {
                warn!(err = %err, "attempt failed, retrying");
            }
        }

        attempts = attempts.saturating_add(1);
        if let Some(max_attempts) = policy.max_attempts {
            if attempts >= max_attempts.get() {
                return Err(Report::new(Error::Timeout(attempts)));
            }
        }

        sleep(policy.interval).await;
    }
}
