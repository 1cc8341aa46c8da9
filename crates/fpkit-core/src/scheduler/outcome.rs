use serde::Serialize;
use std::time::Duration;

/// An action that still failed after its retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Position of the action within the drain that ran it, starting at 0.
    pub position: usize,
    pub label: Option<String>,
    /// Invocations made, the first one included.
    pub attempts: u32,
    pub reason: String,
}

/// Summary of one drain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Actions that completed successfully.
    pub executed: usize,
    pub failures: Vec<FailureRecord>,
    /// Delays and retry back-offs waited, summed.
    #[serde(serialize_with = "serialize_millis")]
    pub waited: Duration,
}

impl DrainReport {
    /// Number of items taken off the queue.
    pub fn drained(&self) -> usize {
        self.executed + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn serialize_millis<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
