//! Closures and pure functions, two ways.
//!
//! - [`scheduler`] queues deferred actions and drains them in FIFO order,
//!   waiting each action's delay before invoking it.
//! - [`report`] is a set of pure transforms over a fixed list of
//!   transactions: filter, aggregate, project, format.
//!
//! The two modules are independent of each other.

pub mod clock;
pub mod config;
pub mod error;
pub mod io;
pub mod report;
pub mod scheduler;

pub use error::{FpkitError, Result};
