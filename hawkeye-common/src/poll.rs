//! Completion polling for prompt cycles.
//!
//! The backend processes a prompt asynchronously; [`CompletionPoller`] fetches
//! the session's cycles until the target reaches a terminal status or the
//! attempt budget runs out. A failed fetch is logged and costs one attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::errors::PollError;
use crate::events;
use crate::sessions::{CycleStatus, PromptCycle};
use crate::sse::streaming::cancelled;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Delay to wait after a non-terminal attempt. Must be deterministic.
pub trait DelayPolicy {
    fn delay(&self, attempt: u32) -> Duration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl DelayPolicy for FixedDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

impl<P: DelayPolicy + ?Sized> DelayPolicy for &P {
    fn delay(&self, attempt: u32) -> Duration {
        (**self).delay(attempt)
    }
}

#[derive(Debug)]
enum PollOutcome {
    Completed(PromptCycle),
    Failed(String),
    NotReady,
    FetchFailed(String),
}

fn classify<E: Display>(fetched: Result<Vec<PromptCycle>, E>, target_id: &str) -> PollOutcome {
    let cycles = match fetched {
        Ok(cycles) => cycles,
        Err(e) => return PollOutcome::FetchFailed(e.to_string()),
    };
    let Some(cycle) = cycles.into_iter().find(|c| c.id == target_id) else {
        return PollOutcome::NotReady;
    };
    match &cycle.status {
        Some(CycleStatus::Completed) => {}
        Some(CycleStatus::Error) => return PollOutcome::Failed(CycleStatus::Error.as_str().to_string()),
        _ => return PollOutcome::NotReady,
    }
    PollOutcome::Completed(cycle)
}

/// Sleep for `delay` unless `cancel` fires first.
pub async fn sleep_or_cancel(delay: Duration, cancel: Option<&CancellationToken>) -> Result<(), PollError> {
    tokio::select! {
        biased;
        _ = cancelled(cancel) => Err(PollError::Cancelled),
        _ = sleep(delay) => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct CompletionPoller<P = FixedDelay> {
    max_attempts: u32,
    policy: P,
    cancel: Option<CancellationToken>,
}

impl Default for CompletionPoller<FixedDelay> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INTERVAL)
    }
}

impl CompletionPoller<FixedDelay> {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            policy: FixedDelay(interval),
            cancel: None,
        }
    }
}

impl<P: DelayPolicy> CompletionPoller<P> {
    /// Replace the delay policy, keeping budget and cancellation.
    pub fn with_policy<Q: DelayPolicy>(self, policy: Q) -> CompletionPoller<Q> {
        CompletionPoller {
            max_attempts: self.max_attempts,
            policy,
            cancel: self.cancel,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Poll `fetch` until the cycle `target_id` is terminal.
    ///
    /// Attempts are strictly sequential. A budget of zero fails without fetching.
    pub async fn poll<F, Fut, E>(&self, target_id: &str, mut fetch: F) -> Result<PromptCycle, PollError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<PromptCycle>, E>>,
        E: Display,
    {
        for attempt in 1..=self.max_attempts {
            let fetched = tokio::select! {
                biased;
                _ = cancelled(self.cancel.as_ref()) => return Err(PollError::Cancelled),
                fetched = fetch() => fetched,
            };

            match classify(fetched, target_id) {
                PollOutcome::Completed(cycle) => {
                    tracing::debug!(cycle_id = target_id, attempts = attempt, "prompt cycle completed");
                    events::emit_poll_completed(attempt);
                    return Ok(cycle);
                }
                PollOutcome::Failed(status) => {
                    return Err(PollError::TargetFailed {
                        cycle_id: target_id.to_string(),
                        status,
                    });
                }
                PollOutcome::NotReady => events::emit_poll_waiting(attempt, self.max_attempts),
                PollOutcome::FetchFailed(error) => {
                    tracing::warn!(
                        cycle_id = target_id,
                        %error,
                        "error polling for completion (attempt {}/{})",
                        attempt,
                        self.max_attempts
                    );
                }
            }

            if attempt < self.max_attempts {
                sleep_or_cancel(self.policy.delay(attempt), self.cancel.as_ref()).await?;
            }
        }

        Err(PollError::BudgetExhausted {
            attempts: self.max_attempts,
        })
    }
}
