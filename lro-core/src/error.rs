//! Wait errors and vendor error payload normalization

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operation::HandleError;
use crate::poller::PollError;
use crate::spec::SpecError;

/// One sub-error of a vendor operation's error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationErrorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Error payload embedded in a finished vendor operation
///
/// Displays as the sub-error messages, one per line, in the order the
/// vendor reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub errors: Vec<OperationErrorEntry>,
}

impl OperationError {
    /// Payload with a single message and optional code
    pub fn from_message(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![OperationErrorEntry {
                code,
                location: None,
                message: message.into(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.errors {
            writeln!(f, "{}", entry.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for OperationError {}

/// Errors returned by the wait engine
#[derive(Debug, Error)]
pub enum WaitError {
    /// The poll request itself failed; not retried
    #[error("Error waiting for {activity}: {source}")]
    Transport {
        activity: String,
        #[source]
        source: PollError,
    },

    /// The vendor reported a status outside both the pending and target sets
    #[error("Error waiting for {activity}: unexpected state '{status}', wanted target '{target}'")]
    UnexpectedStatus {
        activity: String,
        status: String,
        target: String,
    },

    /// No target status within the configured timeout
    #[error(
        "Error waiting for {activity}: timeout while waiting for state to become '{target}' (last state: '{last_status}', timeout: {timeout:?})"
    )]
    Timeout {
        activity: String,
        last_status: String,
        target: String,
        timeout: Duration,
    },

    /// The surrounding orchestration cancelled the wait
    #[error("Error waiting for {activity}: wait cancelled (last state: '{last_status}')")]
    Cancelled {
        activity: String,
        last_status: String,
    },

    /// The operation finished but its payload reports a failure
    #[error("{0}")]
    Operation(OperationError),

    #[error("Invalid wait specification: {0}")]
    InvalidSpec(#[from] SpecError),

    #[error("Invalid operation handle: {0}")]
    InvalidHandle(#[from] HandleError),
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, WaitError::Transport { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }

    /// The vendor payload, when the operation itself failed
    pub fn operation_error(&self) -> Option<&OperationError> {
        match self {
            WaitError::Operation(e) => Some(e),
            _ => None,
        }
    }
}
