//! Compute operation poller
//!
//! The operation's scope picks one of three endpoints (global, regional or
//! zonal operations). The choice is made once, when the poller is built.

use log::debug;
use lro_core::{
    BoxFuture, HandleError, OperationHandle, OperationScope, PollError, PollResult, Poller,
};

use crate::client::ComputeClient;
use crate::config::ApiVersion;
use crate::operation::Operation;

/// Operations collection an operation lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationEndpoint {
    Global { project: String },
    Region { project: String, region: String },
    Zone { project: String, zone: String },
}

impl OperationEndpoint {
    /// Resolve the endpoint for a handle
    ///
    /// The handle's project wins over `default_project`.
    pub fn for_handle(
        handle: &OperationHandle,
        default_project: &str,
    ) -> Result<Self, HandleError> {
        let project = if handle.project().is_empty() {
            if default_project.is_empty() {
                return Err(HandleError::MissingProject(handle.name().to_string()));
            }
            default_project.to_string()
        } else {
            handle.project().to_string()
        };

        match handle.scope() {
            OperationScope::Global => Ok(OperationEndpoint::Global { project }),
            OperationScope::Regional => {
                let region = handle
                    .region()
                    .ok_or_else(|| HandleError::MissingRegion(handle.name().to_string()))?;
                Ok(OperationEndpoint::Region {
                    project,
                    region: region.to_string(),
                })
            }
            OperationScope::Zonal => {
                let zone = handle
                    .zone()
                    .ok_or_else(|| HandleError::MissingZone(handle.name().to_string()))?;
                Ok(OperationEndpoint::Zone {
                    project,
                    zone: zone.to_string(),
                })
            }
        }
    }

    /// URL path of `operation` below the API endpoint
    pub fn operation_path(&self, api_version: ApiVersion, operation: &str) -> String {
        match self {
            OperationEndpoint::Global { project } => format!(
                "/compute/{}/projects/{}/global/operations/{}",
                api_version, project, operation
            ),
            OperationEndpoint::Region { project, region } => format!(
                "/compute/{}/projects/{}/regions/{}/operations/{}",
                api_version, project, region, operation
            ),
            OperationEndpoint::Zone { project, zone } => format!(
                "/compute/{}/projects/{}/zones/{}/operations/{}",
                api_version, project, zone, operation
            ),
        }
    }
}

/// Polls one Compute operation
pub struct ComputeOperationPoller {
    client: ComputeClient,
    operation: String,
    endpoint: OperationEndpoint,
    path: String,
}

impl ComputeOperationPoller {
    pub fn new(client: ComputeClient, handle: &OperationHandle) -> Result<Self, HandleError> {
        let endpoint = OperationEndpoint::for_handle(handle, client.project())?;
        let path = endpoint.operation_path(client.api_version(), handle.name());
        Ok(Self {
            client,
            operation: handle.name().to_string(),
            endpoint,
            path,
        })
    }

    pub fn endpoint(&self) -> &OperationEndpoint {
        &self.endpoint
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Poller for ComputeOperationPoller {
    type Operation = Operation;

    fn poll(&self) -> BoxFuture<'_, Result<Option<PollResult<Operation>>, PollError>> {
        Box::pin(async move {
            let op = self.client.get_operation(&self.path).await?;
            debug!(
                "Got {:?} when asking for operation {:?}",
                op.status, self.operation
            );
            Ok(Some(op.into_poll_result()))
        })
    }
}
