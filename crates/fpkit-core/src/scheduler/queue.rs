use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{FpkitError, Result};

use super::action::{delay_from_millis, ActionResult, ScheduledAction};
use super::outcome::{DrainReport, FailureRecord};
use super::policy::{FailurePolicy, RetryPolicy};

/// Passed to the wait hook right before the queue sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitNotice<'n> {
    pub position: usize,
    pub label: Option<&'n str>,
    pub delay: Duration,
    /// 0 for the action's own delay, `n` for the back-off before retry `n`.
    pub attempt: u32,
}

type WaitHook<'a> = Box<dyn FnMut(&WaitNotice<'_>) + 'a>;
type RetryFilter<'a> = Box<dyn Fn(&anyhow::Error) -> bool + 'a>;

// ---------------------------------------------------------------------------
// DelayQueue
// ---------------------------------------------------------------------------

/// FIFO queue of delayed actions, drained on the calling thread.
///
/// `run` takes `&mut self`, so a queue cannot be drained twice at once.
pub struct DelayQueue<'a, C: Clock = SystemClock> {
    items: VecDeque<ScheduledAction<'a>>,
    clock: C,
    failure_policy: FailurePolicy,
    retry: RetryPolicy,
    on_wait: Option<WaitHook<'a>>,
    retry_if: Option<RetryFilter<'a>>,
}

impl<'a> DelayQueue<'a, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for DelayQueue<'_, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C: Clock> DelayQueue<'a, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            items: VecDeque::new(),
            clock,
            failure_policy: FailurePolicy::default(),
            retry: RetryPolicy::default(),
            on_wait: None,
            retry_if: None,
        }
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Retry only the errors `filter` accepts. Without a filter every error
    /// is retried until the [`RetryPolicy`] runs out.
    pub fn retry_if(mut self, filter: impl Fn(&anyhow::Error) -> bool + 'a) -> Self {
        self.retry_if = Some(Box::new(filter));
        self
    }

    /// Observe every wait before it happens (e.g. to announce it).
    pub fn on_wait(mut self, hook: impl FnMut(&WaitNotice<'_>) + 'a) -> Self {
        self.on_wait = Some(Box::new(hook));
        self
    }

    /// Append an infallible action. It runs once `run` reaches it.
    pub fn enqueue(&mut self, delay: Duration, action: impl FnOnce() + 'a) {
        self.push(ScheduledAction::new(delay, action));
    }

    /// Like [`enqueue`](Self::enqueue) with a signed delay; negative is an error.
    pub fn enqueue_millis(&mut self, delay_ms: i64, action: impl FnOnce() + 'a) -> Result<()> {
        let delay = delay_from_millis(delay_ms)?;
        self.enqueue(delay, action);
        Ok(())
    }

    pub fn enqueue_fallible(
        &mut self,
        delay: Duration,
        action: impl FnMut() -> ActionResult + 'a,
    ) {
        self.push(ScheduledAction::fallible(delay, action));
    }

    pub fn push(&mut self, action: ScheduledAction<'a>) {
        debug!(
            position = self.items.len(),
            label = action.label().unwrap_or(""),
            delay_ms = action.delay().as_millis() as u64,
            "action queued"
        );
        self.items.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Drain the queue head to tail: wait each item's delay, then invoke it.
    ///
    /// Under [`FailurePolicy::Halt`] the first action that still fails after
    /// its retries ends the drain with [`FpkitError::ActionFailed`]; items
    /// behind it stay queued. Under [`FailurePolicy::Continue`] failures are
    /// collected in the returned report.
    pub fn run(&mut self) -> Result<DrainReport> {
        let mut report = DrainReport::default();
        let mut position = 0usize;

        while let Some(mut item) = self.items.pop_front() {
            self.wait(position, &item, item.delay(), 0, &mut report);
            debug!(position, label = item.label().unwrap_or(""), "invoking action");

            let mut attempts = 1u32;
            let outcome = loop {
                match item.invoke() {
                    Ok(()) => break Ok(()),
                    Err(e) => {
                        let reason = format!("{e:#}");
                        warn!(position, attempt = attempts, error = %reason, "action failed");
                        match self.next_backoff(&e, attempts) {
                            Some(backoff) => {
                                self.wait(position, &item, backoff, attempts, &mut report);
                                attempts += 1;
                            }
                            None => break Err(e),
                        }
                    }
                }
            };

            match outcome {
                Ok(()) => report.executed += 1,
                Err(e) => {
                    let record = FailureRecord {
                        position,
                        label: item.into_label(),
                        attempts,
                        reason: format!("{e:#}"),
                    };
                    if self.failure_policy == FailurePolicy::Halt {
                        info!(
                            executed = report.executed,
                            remaining = self.items.len(),
                            "drain halted"
                        );
                        return Err(FpkitError::ActionFailed {
                            position: record.position,
                            label: record.label,
                            reason: record.reason,
                        });
                    }
                    report.failures.push(record);
                }
            }
            position += 1;
        }

        info!(
            executed = report.executed,
            failed = report.failures.len(),
            waited_ms = report.waited.as_millis() as u64,
            "drain complete"
        );
        Ok(report)
    }

    fn next_backoff(&self, err: &anyhow::Error, attempt: u32) -> Option<Duration> {
        let retryable = match &self.retry_if {
            Some(filter) => filter(err),
            None => true,
        };
        if retryable {
            self.retry.backoff(attempt)
        } else {
            None
        }
    }

    fn wait(
        &mut self,
        position: usize,
        item: &ScheduledAction<'a>,
        delay: Duration,
        attempt: u32,
        report: &mut DrainReport,
    ) {
        if let Some(hook) = self.on_wait.as_mut() {
            hook(&WaitNotice {
                position,
                label: item.label(),
                delay,
                attempt,
            });
        }
        debug!(position, attempt, delay_ms = delay.as_millis() as u64, "waiting");
        self.clock.sleep(delay);
        report.waited += delay;
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for DelayQueue<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayQueue")
            .field("items", &self.items)
            .field("clock", &self.clock)
            .field("failure_policy", &self.failure_policy)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
