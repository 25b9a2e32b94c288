//! Poller - Trait abstracting a single status fetch for one operation
//!
//! A Poller is bound to one operation (and its scope) when it is constructed.
//! Each call to `poll` performs exactly one round-trip to the vendor and does
//! not retry; retrying is the wait engine's job.

use std::future::Future;
use std::pin::Pin;

use crate::error::OperationError;

/// Error type for a failed poll
#[derive(Debug)]
pub struct PollError {
    pub message: String,
    /// The vendor answered, but the operation was missing from its response
    pub not_found: bool,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl PollError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            not_found: false,
            cause: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            not_found: true,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Outcome of one successful poll
#[derive(Debug, Clone, PartialEq)]
pub struct PollResult<T> {
    /// Raw vendor status (e.g., "RUNNING", "Launching")
    pub status: String,
    /// Error payload carried by the operation itself, even in a finished state
    pub terminal_error: Option<OperationError>,
    /// The vendor's operation object as last fetched
    pub operation: T,
}

impl<T> PollResult<T> {
    pub fn new(status: impl Into<String>, operation: T) -> Self {
        Self {
            status: status.into(),
            terminal_error: None,
            operation,
        }
    }

    pub fn with_terminal_error(mut self, error: Option<OperationError>) -> Self {
        self.terminal_error = error;
        self
    }
}

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches the current status of one vendor operation
pub trait Poller: Send + Sync {
    /// The vendor object returned by each poll
    type Operation: Send;

    /// Fetch the operation once
    ///
    /// Returns `Ok(None)` when the vendor does not show the operation yet
    /// (read-after-write lag). The engine keeps polling in that case.
    fn poll(&self) -> BoxFuture<'_, Result<Option<PollResult<Self::Operation>>, PollError>>;
}

impl<P: Poller + ?Sized> Poller for &P {
    type Operation = P::Operation;

    fn poll(&self) -> BoxFuture<'_, Result<Option<PollResult<Self::Operation>>, PollError>> {
        (**self).poll()
    }
}

impl<P: Poller + ?Sized> Poller for Box<P> {
    type Operation = P::Operation;

    fn poll(&self) -> BoxFuture<'_, Result<Option<PollResult<Self::Operation>>, PollError>> {
        (**self).poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    // Mock Poller for testing
    struct FixedPoller(&'static str);

    impl Poller for FixedPoller {
        type Operation = String;

        fn poll(&self) -> BoxFuture<'_, Result<Option<PollResult<String>>, PollError>> {
            let status = self.0;
            Box::pin(async move { Ok(Some(PollResult::new(status, status.to_lowercase()))) })
        }
    }

    #[tokio::test]
    async fn fixed_poller_is_idempotent() {
        let poller = FixedPoller("RUNNING");
        let first = poller.poll().await.unwrap().unwrap();
        let second = poller.poll().await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.status, "RUNNING");
        assert_eq!(first.operation, "running");
    }

    #[tokio::test]
    async fn boxed_poller_forwards() {
        let poller: Box<dyn Poller<Operation = String>> = Box::new(FixedPoller("DONE"));
        let result = poller.poll().await.unwrap().unwrap();
        assert_eq!(result.status, "DONE");
    }

    #[test]
    fn poll_error_display_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out");
        let error = PollError::new("Failed to get operation").with_cause(io);
        assert_eq!(error.to_string(), "Failed to get operation");
        assert!(!error.not_found);
        assert_eq!(error.source().unwrap().to_string(), "connection timed out");
    }

    #[test]
    fn poll_error_not_found() {
        let error = PollError::not_found("environment not found");
        assert!(error.not_found);
        assert!(error.source().is_none());
    }
}
