//! Elastic Beanstalk environment status poller
//!
//! Environments have no operation resource; the environment's own status is
//! polled instead (Launching/Updating -> Ready, Terminating -> Terminated).

use std::time::Duration;

use aws_sdk_elasticbeanstalk::Client as BeanstalkClient;
use aws_sdk_elasticbeanstalk::error::DisplayErrorContext;
use aws_sdk_elasticbeanstalk::types::EnvironmentDescription;
use log::debug;
use lro_core::{
    BoxFuture, OperationHandle, PollError, PollResult, Poller, WaitError, WaitSpec,
    wait_for_operation,
};

use crate::clients::AwsClients;

/// Environment changes can take a while (10 minutes)
pub const ENVIRONMENT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub const ENVIRONMENT_DELAY: Duration = Duration::from_secs(10);

pub const ENVIRONMENT_MIN_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Wait for a created or updated environment to become Ready
pub fn environment_ready_spec() -> WaitSpec {
    WaitSpec::new(["Launching", "Updating"], ["Ready"])
        .with_delay(ENVIRONMENT_DELAY)
        .with_timeout(ENVIRONMENT_TIMEOUT)
        .with_min_poll_interval(ENVIRONMENT_MIN_POLL_INTERVAL)
}

/// Wait for a terminated environment to be gone
pub fn environment_terminated_spec() -> WaitSpec {
    WaitSpec::new(["Terminating"], ["Terminated"])
        .with_delay(ENVIRONMENT_DELAY)
        .with_timeout(ENVIRONMENT_TIMEOUT)
        .with_min_poll_interval(ENVIRONMENT_MIN_POLL_INTERVAL)
}

/// Polls one environment with `DescribeEnvironments`
pub struct EnvironmentPoller {
    client: BeanstalkClient,
    environment_id: String,
}

impl EnvironmentPoller {
    /// The handle's name is the environment id
    pub fn new(client: BeanstalkClient, handle: &OperationHandle) -> Self {
        Self {
            client,
            environment_id: handle.name().to_string(),
        }
    }

    pub fn environment_id(&self) -> &str {
        &self.environment_id
    }
}

impl Poller for EnvironmentPoller {
    type Operation = EnvironmentDescription;

    fn poll(
        &self,
    ) -> BoxFuture<'_, Result<Option<PollResult<EnvironmentDescription>>, PollError>> {
        Box::pin(async move {
            let response = self
                .client
                .describe_environments()
                .environment_ids(&self.environment_id)
                .send()
                .await
                .map_err(|e| {
                    PollError::new(format!(
                        "Failed to describe environment: {}",
                        DisplayErrorContext(&e)
                    ))
                    .with_cause(e)
                })?;

            select_environment(response.environments(), &self.environment_id)
        })
    }
}

/// Pick the polled environment out of a `DescribeEnvironments` response
///
/// An empty list means the environment is not visible yet.
pub fn select_environment(
    environments: &[EnvironmentDescription],
    environment_id: &str,
) -> Result<Option<PollResult<EnvironmentDescription>>, PollError> {
    if environments.is_empty() {
        debug!(
            "Elastic Beanstalk Environment {} not visible yet",
            environment_id
        );
        return Ok(None);
    }

    let env = environments
        .iter()
        .find(|e| e.environment_id() == Some(environment_id))
        .ok_or_else(|| {
            PollError::not_found(format!(
                "Error finding Elastic Beanstalk Environment {}, environment not found",
                environment_id
            ))
        })?;

    let status = env.status().map(|s| s.as_str()).unwrap_or_default();
    debug!(
        "Elastic Beanstalk Environment {} is {:?}",
        environment_id, status
    );
    Ok(Some(PollResult::new(status, env.clone())))
}

/// Wait for an environment to become Ready after create or update
pub async fn wait_for_environment_ready(
    clients: &AwsClients,
    environment_id: &str,
) -> Result<EnvironmentDescription, WaitError> {
    wait_for_environment(
        clients,
        environment_id,
        &environment_ready_spec(),
        "become ready",
    )
    .await
}

/// Wait for an environment to reach Terminated after TerminateEnvironment
pub async fn wait_for_environment_terminated(
    clients: &AwsClients,
    environment_id: &str,
) -> Result<EnvironmentDescription, WaitError> {
    wait_for_environment(
        clients,
        environment_id,
        &environment_terminated_spec(),
        "become terminated",
    )
    .await
}

async fn wait_for_environment(
    clients: &AwsClients,
    environment_id: &str,
    spec: &WaitSpec,
    goal: &str,
) -> Result<EnvironmentDescription, WaitError> {
    let handle = OperationHandle::regional(environment_id, clients.region())?;
    let poller = EnvironmentPoller::new(clients.elasticbeanstalk.clone(), &handle);
    wait_for_operation(&poller, spec, &environment_activity(environment_id, goal)).await
}

/// Activity text used in wait errors
pub fn environment_activity(environment_id: &str, goal: &str) -> String {
    format!(
        "Elastic Beanstalk Environment ({}) to {}",
        environment_id, goal
    )
}
