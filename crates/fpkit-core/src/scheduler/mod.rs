//! Delay queue runner.
//!
//! A queue of `(delay, action)` pairs drained strictly in insertion order:
//! wait for the item's delay, invoke it, move on. Nothing runs concurrently
//! and nothing is reordered.
//!
//! ```text
//! enqueue ──► [ a | b | c ] ──► run: sleep(a.delay); a() ; sleep(b.delay); b() ; ...
//! ```
//!
//! [`DelayQueue`] blocks the calling thread through a [`Clock`](crate::clock::Clock).
//! [`AsyncDelayQueue`] is the tokio flavour that can be drained on a
//! background task.

pub mod action;
pub mod async_queue;
pub mod outcome;
pub mod policy;
pub mod queue;

pub use action::{delay_from_millis, ActionResult, AsyncAction, ScheduledAction};
pub use async_queue::AsyncDelayQueue;
pub use outcome::{DrainReport, FailureRecord};
pub use policy::{FailurePolicy, RetryPolicy};
pub use queue::{DelayQueue, WaitNotice};
