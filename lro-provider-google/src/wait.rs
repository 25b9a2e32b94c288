//! Wait presets for Compute operations
//!
//! Compute operations move PENDING -> RUNNING -> DONE. A DONE operation may
//! still carry an `error` payload, which is returned as `WaitError::Operation`.

use std::time::Duration;

use lro_core::{OperationHandle, WaitError, WaitSpec, wait_for_operation};

use crate::client::ComputeClient;
use crate::operation::Operation;
use crate::poller::ComputeOperationPoller;

/// Default timeout for Compute operations (4 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4 * 60);

/// Pause before the first poll; inserts and deletes never finish sooner
pub const INITIAL_DELAY: Duration = Duration::from_secs(10);

pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Compute status vocabulary with the given timeout
pub fn compute_wait_spec(timeout: Duration) -> WaitSpec {
    WaitSpec::new(["PENDING", "RUNNING"], ["DONE"])
        .with_delay(INITIAL_DELAY)
        .with_timeout(timeout)
        .with_min_poll_interval(MIN_POLL_INTERVAL)
}

/// Compute status vocabulary with a timeout in minutes
///
/// Saturates instead of overflowing; an unrepresentable timeout means no deadline.
pub fn compute_wait_time_spec(minutes: u64) -> WaitSpec {
    compute_wait_spec(Duration::from_secs(minutes.saturating_mul(60)))
}

/// Wait for a Compute operation with the default timeout
pub async fn compute_operation_wait(
    client: &ComputeClient,
    handle: &OperationHandle,
    activity: &str,
) -> Result<Operation, WaitError> {
    compute_operation_wait_with_spec(
        client,
        handle,
        &compute_wait_spec(DEFAULT_TIMEOUT),
        activity,
    )
    .await
}

/// Wait for a Compute operation, giving up after `minutes`
///
/// Zonal operations such as instance creation can run longer than the default.
pub async fn compute_operation_wait_time(
    client: &ComputeClient,
    handle: &OperationHandle,
    minutes: u64,
    activity: &str,
) -> Result<Operation, WaitError> {
    compute_operation_wait_with_spec(client, handle, &compute_wait_time_spec(minutes), activity)
        .await
}

pub async fn compute_operation_wait_with_spec(
    client: &ComputeClient,
    handle: &OperationHandle,
    spec: &WaitSpec,
    activity: &str,
) -> Result<Operation, WaitError> {
    let poller = ComputeOperationPoller::new(client.clone(), handle)?;
    wait_for_operation(&poller, spec, activity).await
}
