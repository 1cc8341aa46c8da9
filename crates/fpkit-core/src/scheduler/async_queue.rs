//! Tokio flavour of the delay queue.
//!
//! Waits with `tokio::time::sleep` instead of blocking a thread, so the drain
//! can run on a background task while the caller keeps going. Ordering rules
//! are the same as [`DelayQueue`](super::DelayQueue): FIFO, one action in
//! flight at a time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{FpkitError, Result};

use super::action::{delay_from_millis, ActionResult, AsyncAction};
use super::outcome::{DrainReport, FailureRecord};
use super::policy::{FailurePolicy, RetryPolicy};
use super::queue::WaitNotice;

type WaitHook = Box<dyn Fn(&WaitNotice<'_>) + Send + Sync>;
type RetryFilter = Box<dyn Fn(&anyhow::Error) -> bool + Send + Sync>;

/// Clears the running flag when a drain ends, even if it is cancelled.
struct RunningGuard<'q>(&'q AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Default)]
pub struct AsyncDelayQueue {
    items: Mutex<VecDeque<AsyncAction>>,
    running: AtomicBool,
    failure_policy: FailurePolicy,
    retry: RetryPolicy,
    on_wait: Option<WaitHook>,
    retry_if: Option<RetryFilter>,
}

impl AsyncDelayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Retry only the errors `filter` accepts.
    pub fn retry_if(
        mut self,
        filter: impl Fn(&anyhow::Error) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.retry_if = Some(Box::new(filter));
        self
    }

    /// Observe every wait before it happens.
    pub fn on_wait(mut self, hook: impl Fn(&WaitNotice<'_>) + Send + Sync + 'static) -> Self {
        self.on_wait = Some(Box::new(hook));
        self
    }

    pub fn enqueue(&self, delay: Duration, action: impl FnOnce() + Send + 'static) {
        self.push(AsyncAction::new(delay, action));
    }

    pub fn enqueue_millis(
        &self,
        delay_ms: i64,
        action: impl FnOnce() + Send + 'static,
    ) -> Result<()> {
        let delay = delay_from_millis(delay_ms)?;
        self.enqueue(delay, action);
        Ok(())
    }

    pub fn enqueue_fallible(
        &self,
        delay: Duration,
        action: impl FnMut() -> ActionResult + Send + 'static,
    ) {
        self.push(AsyncAction::fallible(delay, action));
    }

    pub fn push(&self, action: AsyncAction) {
        let mut items = self.lock_items();
        debug!(
            position = items.len(),
            label = action.label().unwrap_or(""),
            delay_ms = action.delay().as_millis() as u64,
            "action queued"
        );
        items.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Drain until the queue is empty, including items enqueued meanwhile.
    ///
    /// Fails with [`FpkitError::AlreadyRunning`] if another drain of this
    /// queue is in progress.
    pub async fn run(&self) -> Result<DrainReport> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(FpkitError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let mut report = DrainReport::default();
        let mut position = 0usize;

        loop {
            let next = self.lock_items().pop_front();
            let Some(mut item) = next else { break };

            let (label, delay) = (item.label(), item.delay());
            self.wait(position, label, delay, 0, &mut report).await;
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
                                let label = item.label();
                                self.wait(position, label, backoff, attempts, &mut report)
                                    .await;
                                attempts += 1;
                            }
                            None => break Err(reason),
                        }
                    }
                }
            };

            match outcome {
                Ok(()) => report.executed += 1,
                Err(reason) => {
                    if self.failure_policy == FailurePolicy::Halt {
                        info!(
                            executed = report.executed,
                            remaining = self.len(),
                            "drain halted"
                        );
                        return Err(FpkitError::ActionFailed {
                            position,
                            label: item.into_label(),
                            reason,
                        });
                    }
                    report.failures.push(FailureRecord {
                        position,
                        label: item.into_label(),
                        attempts,
                        reason,
                    });
                }
            }
            position += 1;
        }

        info!(
            executed = report.executed,
            failed = report.failures.len(),
            waited_ms = report.waited.as_millis() as u64,
            "async drain complete"
        );
        Ok(report)
    }

    /// Drain on a tokio task and hand back its handle.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<Result<DrainReport>> {
        tokio::spawn(async move { self.run().await })
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

    async fn wait(
        &self,
        position: usize,
        label: Option<&str>,
        delay: Duration,
        attempt: u32,
        report: &mut DrainReport,
    ) {
        if let Some(hook) = &self.on_wait {
            hook(&WaitNotice {
                position,
                label,
                delay,
                attempt,
            });
        }
        debug!(position, attempt, delay_ms = delay.as_millis() as u64, "waiting");
        tokio::time::sleep(delay).await;
        report.waited += delay;
    }

    fn lock_items(&self) -> MutexGuard<'_, VecDeque<AsyncAction>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
