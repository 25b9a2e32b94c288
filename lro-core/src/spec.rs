//! Wait specification - status vocabularies and poll timing for one wait

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;

/// Default overall timeout (5 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default interval between polls (2 seconds)
pub const DEFAULT_MIN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How a polled status relates to a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Pending,
    Target,
    Unexpected,
}

/// Errors in a wait specification that would keep the engine from terminating
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("Wait specification has no target statuses")]
    NoTarget,

    #[error("Minimum poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// Pending/target statuses and timing for waiting on one kind of operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    /// Statuses meaning the operation is still in progress
    pub pending: BTreeSet<String>,

    /// Statuses meaning the operation has finished
    pub target: BTreeSet<String>,

    /// Pause before the very first poll
    pub delay: Duration,

    /// Wall-clock limit measured from the start of the wait
    pub timeout: Duration,

    /// Pause between consecutive polls
    pub min_poll_interval: Duration,
}

impl WaitSpec {
    pub fn new<P, T, S>(pending: P, target: T) -> Self
    where
        P: IntoIterator<Item = S>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pending: pending.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
            delay: Duration::ZERO,
            timeout: DEFAULT_TIMEOUT,
            min_poll_interval: DEFAULT_MIN_POLL_INTERVAL,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_poll_interval(mut self, interval: Duration) -> Self {
        self.min_poll_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        if self.target.is_empty() {
            return Err(SpecError::NoTarget);
        }
        if self.min_poll_interval.is_zero() {
            return Err(SpecError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Classify a status; a status listed as both target and pending is a target
    pub fn classify(&self, status: &str) -> StatusClass {
        if self.target.contains(status) {
            StatusClass::Target
        } else if self.pending.contains(status) {
            StatusClass::Pending
        } else {
            StatusClass::Unexpected
        }
    }

    /// Target statuses joined for error messages (e.g. "DONE" or "FAILED, SUCCESS")
    pub fn target_description(&self) -> String {
        self.target
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute_spec() -> WaitSpec {
        WaitSpec::new(["PENDING", "RUNNING"], ["DONE"])
    }

    #[test]
    fn test_defaults() {
        let spec = compute_spec();
        assert_eq!(spec.delay, Duration::ZERO);
        assert_eq!(spec.timeout, Duration::from_secs(300));
        assert_eq!(spec.min_poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_builder() {
        let spec = compute_spec()
            .with_delay(Duration::from_secs(10))
            .with_timeout(Duration::from_secs(240))
            .with_min_poll_interval(Duration::from_secs(3));
        assert_eq!(spec.delay, Duration::from_secs(10));
        assert_eq!(spec.timeout, Duration::from_secs(240));
        assert_eq!(spec.min_poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_classify() {
        let spec = compute_spec();
        assert_eq!(spec.classify("RUNNING"), StatusClass::Pending);
        assert_eq!(spec.classify("PENDING"), StatusClass::Pending);
        assert_eq!(spec.classify("DONE"), StatusClass::Target);
        assert_eq!(spec.classify("done"), StatusClass::Unexpected);
        assert_eq!(spec.classify(""), StatusClass::Unexpected);
    }

    #[test]
    fn test_classify_target_wins_over_pending() {
        let spec = WaitSpec::new(["Ready", "Updating"], ["Ready"]);
        assert_eq!(spec.classify("Ready"), StatusClass::Target);
    }

    #[test]
    fn test_target_description_is_sorted() {
        let spec = WaitSpec::new(["PENDING"], ["SUCCESS", "FAILED", "CANCEL_COMPLETE"]);
        assert_eq!(spec.target_description(), "CANCEL_COMPLETE, FAILED, SUCCESS");
    }

    #[test]
    fn test_validate() {
        assert_eq!(compute_spec().validate(), Ok(()));

        let no_target = WaitSpec::new(["RUNNING"], Vec::<&str>::new());
        assert_eq!(no_target.validate(), Err(SpecError::NoTarget));

        let spin = compute_spec().with_min_poll_interval(Duration::ZERO);
        assert_eq!(spin.validate(), Err(SpecError::ZeroPollInterval));
    }
}
