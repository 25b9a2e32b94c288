//! Compute Engine `Operation` resource
//!
//! Only the fields the waiter and its callers look at are decoded.

use lro_core::{OperationError, PollResult};
use serde::{Deserialize, Serialize};

/// An asynchronous Compute operation as returned by `*Operations.get`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    /// PENDING, RUNNING or DONE
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_error_status_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_error_message: Option<String>,
    /// Set when the operation finished with errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl Operation {
    pub fn into_poll_result(self) -> PollResult<Operation> {
        let status = self.status.clone();
        let error = self.error.clone();
        PollResult::new(status, self).with_terminal_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_running_operation() {
        let json = r#"{
            "kind": "compute#operation",
            "id": "1234567890",
            "name": "operation-1481000000000-abc",
            "operationType": "insert",
            "targetLink": "https://www.googleapis.com/compute/v1/projects/p/global/networks/default",
            "status": "RUNNING",
            "progress": 0
        }"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.name, "operation-1481000000000-abc");
        assert_eq!(op.status, "RUNNING");
        assert_eq!(op.operation_type.as_deref(), Some("insert"));
        assert_eq!(op.progress, Some(0));
        assert!(op.error.is_none());

        let result = op.into_poll_result();
        assert_eq!(result.status, "RUNNING");
        assert!(result.terminal_error.is_none());
    }

    #[test]
    fn test_deserialize_done_with_error() {
        let json = r#"{
            "name": "operation-1",
            "status": "DONE",
            "httpErrorStatusCode": 409,
            "httpErrorMessage": "CONFLICT",
            "error": {
                "errors": [
                    {
                        "code": "RESOURCE_ALREADY_EXISTS",
                        "message": "The resource 'projects/p/global/networks/default' already exists"
                    }
                ]
            }
        }"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.http_error_status_code, Some(409));

        let result = op.into_poll_result();
        assert_eq!(result.status, "DONE");
        assert_eq!(
            result.terminal_error.unwrap().to_string(),
            "The resource 'projects/p/global/networks/default' already exists\n"
        );
        assert_eq!(result.operation.name, "operation-1");
    }
}
