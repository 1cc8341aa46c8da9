use crate::error::{FpkitError, Result};
use std::fmt;
use std::time::Duration;

/// Outcome of one invocation of a fallible action.
pub type ActionResult = anyhow::Result<()>;

type BoxedAction<'a> = Box<dyn FnMut() -> ActionResult + 'a>;

/// Convert a signed millisecond count into a delay, rejecting negatives.
pub fn delay_from_millis(ms: i64) -> Result<Duration> {
    u64::try_from(ms)
        .map(Duration::from_millis)
        .map_err(|_| FpkitError::InvalidArgument(format!("delay must be >= 0 ms, got {ms}")))
}

// ---------------------------------------------------------------------------
// ScheduledAction
// ---------------------------------------------------------------------------

/// A deferred unit of work and the delay that precedes it.
///
/// The closure may capture by value (`move`) or borrow from the enclosing
/// scope for `'a`; the queue holding it cannot outlive those borrows.
pub struct ScheduledAction<'a> {
    delay: Duration,
    label: Option<String>,
    action: BoxedAction<'a>,
}

impl<'a> ScheduledAction<'a> {
    /// Wrap an infallible, run-once action.
    pub fn new(delay: Duration, action: impl FnOnce() + 'a) -> Self {
        let mut once = Some(action);
        Self::fallible(delay, move || {
            if let Some(f) = once.take() {
                f();
            }
            Ok(())
        })
    }

    /// Wrap an action that can fail. It may be invoked again on retry.
    pub fn fallible(delay: Duration, action: impl FnMut() -> ActionResult + 'a) -> Self {
        Self {
            delay,
            label: None,
            action: Box::new(action),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn invoke(&mut self) -> ActionResult {
        (self.action)()
    }

    pub(crate) fn into_label(self) -> Option<String> {
        self.label
    }
}

impl fmt::Debug for ScheduledAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledAction")
            .field("delay", &self.delay)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// AsyncAction
// ---------------------------------------------------------------------------

type SendAction = Box<dyn FnMut() -> ActionResult + Send + 'static>;

/// [`ScheduledAction`] for [`AsyncDelayQueue`](super::AsyncDelayQueue). The
/// closure owns what it captures and may move to another thread.
pub struct AsyncAction {
    delay: Duration,
    label: Option<String>,
    action: SendAction,
}

impl AsyncAction {
    pub fn new(delay: Duration, action: impl FnOnce() + Send + 'static) -> Self {
        let mut once = Some(action);
        Self::fallible(delay, move || {
            if let Some(f) = once.take() {
                f();
            }
            Ok(())
        })
    }

    pub fn fallible(
        delay: Duration,
        action: impl FnMut() -> ActionResult + Send + 'static,
    ) -> Self {
        Self {
            delay,
            label: None,
            action: Box::new(action),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn invoke(&mut self) -> ActionResult {
        (self.action)()
    }

    pub(crate) fn into_label(self) -> Option<String> {
        self.label
    }
}

impl fmt::Debug for AsyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAction")
            .field("delay", &self.delay)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
