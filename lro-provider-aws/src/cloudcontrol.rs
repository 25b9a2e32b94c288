//! Cloud Control resource request poller
//!
//! Create, update and delete calls return a progress event with a request
//! token. `GetResourceRequestStatus` is polled with that token until the
//! request reaches SUCCESS, FAILED or CANCEL_COMPLETE. The last two carry
//! an error payload.

use std::time::Duration;

use aws_sdk_cloudcontrol::Client as CloudControlClient;
use aws_sdk_cloudcontrol::error::DisplayErrorContext;
use aws_sdk_cloudcontrol::types::{OperationStatus, ProgressEvent};
use log::debug;
use lro_core::{
    BoxFuture, OperationError, OperationHandle, PollError, PollResult, Poller, WaitError,
    WaitSpec, wait_for_operation,
};

use crate::clients::AwsClients;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub const REQUEST_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Cloud Control request status vocabulary
pub fn request_status_spec() -> WaitSpec {
    WaitSpec::new(
        [
            OperationStatus::Pending.as_str(),
            OperationStatus::InProgress.as_str(),
            OperationStatus::CancelInProgress.as_str(),
        ],
        [
            OperationStatus::Success.as_str(),
            OperationStatus::Failed.as_str(),
            OperationStatus::CancelComplete.as_str(),
        ],
    )
    .with_timeout(REQUEST_TIMEOUT)
    .with_min_poll_interval(REQUEST_POLL_INTERVAL)
}

/// Polls one Cloud Control request by token
pub struct RequestStatusPoller {
    client: CloudControlClient,
    request_token: String,
}

impl RequestStatusPoller {
    /// The handle's name is the request token
    pub fn new(client: CloudControlClient, handle: &OperationHandle) -> Self {
        Self {
            client,
            request_token: handle.name().to_string(),
        }
    }

    pub fn request_token(&self) -> &str {
        &self.request_token
    }
}

impl Poller for RequestStatusPoller {
    type Operation = ProgressEvent;

    fn poll(&self) -> BoxFuture<'_, Result<Option<PollResult<ProgressEvent>>, PollError>> {
        Box::pin(async move {
            let status = self
                .client
                .get_resource_request_status()
                .request_token(&self.request_token)
                .send()
                .await
                .map_err(|e| {
                    PollError::new(format!(
                        "Failed to get operation status: {}",
                        DisplayErrorContext(&e)
                    ))
                    .with_cause(e)
                })?;

            let result = progress_to_poll_result(status.progress_event());
            if let Some(result) = &result {
                debug!(
                    "Got {:?} when asking for request {:?}",
                    result.status, self.request_token
                );
            }
            Ok(result)
        })
    }
}

/// Map a progress event onto a poll result
///
/// No event yet is treated as not visible. Failed and cancelled requests
/// report their reason as the terminal error.
pub fn progress_to_poll_result(
    progress: Option<&ProgressEvent>,
) -> Option<PollResult<ProgressEvent>> {
    let progress = progress?;
    let status = progress
        .operation_status()
        .map(|s| s.as_str())
        .unwrap_or_default();

    let terminal_error = match progress.operation_status() {
        Some(OperationStatus::Failed) => Some(OperationError::from_message(
            progress.error_code().map(|c| c.as_str().to_string()),
            progress.status_message().unwrap_or("Unknown error"),
        )),
        Some(OperationStatus::CancelComplete) => {
            Some(OperationError::from_message(None, "Operation was cancelled"))
        }
        _ => None,
    };

    Some(PollResult::new(status, progress.clone()).with_terminal_error(terminal_error))
}

/// Wait for a Cloud Control request and return the resource identifier
pub async fn wait_for_resource_request(
    clients: &AwsClients,
    request_token: &str,
    activity: &str,
) -> Result<String, WaitError> {
    let handle = OperationHandle::regional(request_token, clients.region())?;
    let poller = RequestStatusPoller::new(clients.cloudcontrol.clone(), &handle);
    let progress = wait_for_operation(&poller, &request_status_spec(), activity).await?;
    Ok(progress.identifier().unwrap_or("").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cloudcontrol::config::retry::RetryConfig;
    use aws_sdk_cloudcontrol::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_cloudcontrol::types::HandlerErrorCode;
    use aws_sdk_cloudcontrol::types::builders::ProgressEventBuilder;
    use lro_core::StatusClass;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AMZ_JSON: &str = "application/x-amz-json-1.0";

    fn mock_client(mock_server: &MockServer) -> CloudControlClient {
        let config = aws_sdk_cloudcontrol::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new(
                "test-key",
                "test-secret",
                None,
                None,
                "test",
            ))
            .endpoint_url(mock_server.uri())
            .retry_config(RetryConfig::disabled())
            .build();
        CloudControlClient::from_conf(config)
    }

    fn fast_spec() -> WaitSpec {
        request_status_spec().with_min_poll_interval(Duration::from_millis(10))
    }

    async fn mount_progress(mock_server: &MockServer, progress: &str, times: u64) {
        let body = format!(r#"{{"ProgressEvent": {progress}}}"#);
        Mock::given(method("POST"))
            .and(header(
                "x-amz-target",
                "CloudApiService.GetResourceRequestStatus",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.into_bytes(), AMZ_JSON))
            .up_to_n_times(times)
            .mount(mock_server)
            .await;
    }

    fn poller(mock_server: &MockServer) -> RequestStatusPoller {
        let handle = OperationHandle::regional("token-1", "us-east-1").unwrap();
        RequestStatusPoller::new(mock_client(mock_server), &handle)
    }

    fn event(status: OperationStatus) -> ProgressEventBuilder {
        ProgressEvent::builder()
            .type_name("AWS::EC2::VPC")
            .request_token("token-1")
            .operation_status(status)
    }

    #[test]
    fn test_missing_progress_event_is_not_visible() {
        assert!(progress_to_poll_result(None).is_none());
    }

    #[test]
    fn test_in_progress() {
        let progress = event(OperationStatus::InProgress).build();
        let result = progress_to_poll_result(Some(&progress)).unwrap();
        assert_eq!(result.status, "IN_PROGRESS");
        assert!(result.terminal_error.is_none());
    }

    #[test]
    fn test_success_carries_identifier() {
        let progress = event(OperationStatus::Success)
            .identifier("vpc-0abc")
            .build();
        let result = progress_to_poll_result(Some(&progress)).unwrap();
        assert_eq!(result.status, "SUCCESS");
        assert!(result.terminal_error.is_none());
        assert_eq!(result.operation.identifier(), Some("vpc-0abc"));
    }

    #[test]
    fn test_failed_carries_status_message() {
        let progress = event(OperationStatus::Failed)
            .error_code(HandlerErrorCode::AlreadyExists)
            .status_message("Resource of type 'AWS::EC2::VPC' already exists")
            .build();
        let result = progress_to_poll_result(Some(&progress)).unwrap();
        assert_eq!(result.status, "FAILED");

        let error = result.terminal_error.unwrap();
        assert_eq!(error.errors[0].code.as_deref(), Some("AlreadyExists"));
        assert_eq!(
            error.to_string(),
            "Resource of type 'AWS::EC2::VPC' already exists\n"
        );
    }

    #[test]
    fn test_failed_without_message() {
        let progress = event(OperationStatus::Failed).build();
        let result = progress_to_poll_result(Some(&progress)).unwrap();
        assert_eq!(result.terminal_error.unwrap().to_string(), "Unknown error\n");
    }

    #[test]
    fn test_cancel_complete() {
        let progress = event(OperationStatus::CancelComplete).build();
        let result = progress_to_poll_result(Some(&progress)).unwrap();
        assert_eq!(
            result.terminal_error.unwrap().to_string(),
            "Operation was cancelled\n"
        );
    }

    #[tokio::test]
    async fn test_poller_waits_for_success() {
        let mock_server = MockServer::start().await;
        mount_progress(
            &mock_server,
            r#"{"TypeName": "AWS::EC2::VPC", "RequestToken": "token-1", "OperationStatus": "IN_PROGRESS"}"#,
            2,
        )
        .await;
        mount_progress(
            &mock_server,
            r#"{"TypeName": "AWS::EC2::VPC", "RequestToken": "token-1", "Identifier": "vpc-0abc", "OperationStatus": "SUCCESS"}"#,
            1,
        )
        .await;

        let progress = wait_for_operation(&poller(&mock_server), &fast_spec(), "Creating VPC")
            .await
            .unwrap();

        assert_eq!(progress.identifier(), Some("vpc-0abc"));
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_poller_failed_request_surfaces_payload() {
        let mock_server = MockServer::start().await;
        mount_progress(
            &mock_server,
            r#"{"TypeName": "AWS::EC2::VPC", "RequestToken": "token-1", "OperationStatus": "FAILED", "ErrorCode": "AlreadyExists", "StatusMessage": "vpc-0abc already exists"}"#,
            1,
        )
        .await;

        let err = wait_for_operation(&poller(&mock_server), &fast_spec(), "Creating VPC")
            .await
            .unwrap_err();

        let payload = err.operation_error().unwrap();
        assert_eq!(payload.errors[0].code.as_deref(), Some("AlreadyExists"));
        assert_eq!(err.to_string(), "vpc-0abc already exists\n");
    }

    #[tokio::test]
    async fn test_poller_sdk_error_is_transport() {
        let mock_server = MockServer::start().await;
        let body = r#"{"__type": "RequestTokenNotFoundException", "Message": "Request token-1 not found"}"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_raw(body, AMZ_JSON))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = wait_for_operation(&poller(&mock_server), &fast_spec(), "Creating VPC")
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert!(
            err.to_string()
                .starts_with("Error waiting for Creating VPC: Failed to get operation status: ")
        );
    }

    #[test]
    fn test_request_status_spec() {
        let spec = request_status_spec();
        assert_eq!(spec.classify("PENDING"), StatusClass::Pending);
        assert_eq!(spec.classify("IN_PROGRESS"), StatusClass::Pending);
        assert_eq!(spec.classify("CANCEL_IN_PROGRESS"), StatusClass::Pending);
        assert_eq!(spec.classify("SUCCESS"), StatusClass::Target);
        assert_eq!(spec.classify("FAILED"), StatusClass::Target);
        assert_eq!(spec.classify("CANCEL_COMPLETE"), StatusClass::Target);
        assert_eq!(spec.delay, Duration::ZERO);
        assert_eq!(spec.timeout, Duration::from_secs(600));
        assert_eq!(spec.min_poll_interval, Duration::from_secs(5));
    }
}
