use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What a drain does once an action has failed for good.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure. The remaining items stay queued.
    #[default]
    Halt,
    /// Record the failure and keep draining.
    Continue,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Halt => "halt",
            Self::Continue => "continue",
        }
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Exponential back-off for fallible actions.
///
/// Retry `n` (1-based) waits `base_delay * 2^n`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// No retries: a failed action is final on its first attempt.
    pub const NONE: RetryPolicy = RetryPolicy {
        max_retries: 0,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Back-off before retry `attempt`, or `None` once retries are exhausted.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let delay = 2u32
            .checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), None);
        assert_eq!(FailurePolicy::default(), FailurePolicy::Halt);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500), Duration::from_millis(5000));
        assert_eq!(policy.backoff(1), Some(Duration::from_millis(1000)));
        assert_eq!(policy.backoff(2), Some(Duration::from_millis(2000)));
        assert_eq!(policy.backoff(3), Some(Duration::from_millis(4000)));
        assert_eq!(policy.backoff(4), Some(Duration::from_millis(5000)));
        assert_eq!(policy.backoff(5), Some(Duration::from_millis(5000)));
        assert_eq!(policy.backoff(6), None);
    }

    #[test]
    fn backoff_overflow_falls_back_to_cap() {
        let policy = RetryPolicy::new(64, Duration::from_secs(1), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Some(Duration::from_secs(10)));
    }

    #[test]
    fn failure_policy_serde_is_snake_case() {
        let yaml = serde_yaml::to_string(&FailurePolicy::Continue).unwrap();
        assert_eq!(yaml.trim(), "continue");
        let parsed: FailurePolicy = serde_yaml::from_str("halt").unwrap();
        assert_eq!(parsed, FailurePolicy::Halt);
    }
}
