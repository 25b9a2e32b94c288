//! Lro AWS Provider
//!
//! Pollers for AWS asynchronous work that has no operation id of its own:
//! Elastic Beanstalk environments are watched through their status, Cloud
//! Control requests through their request token.
//!
//! ## Module Structure
//!
//! - `clients` - SDK client construction
//! - `beanstalk` - Elastic Beanstalk environment status poller
//! - `cloudcontrol` - Cloud Control resource request poller

pub mod beanstalk;
pub mod clients;
pub mod cloudcontrol;

// Re-export main types
pub use beanstalk::{
    EnvironmentPoller, environment_ready_spec, environment_terminated_spec,
    wait_for_environment_ready, wait_for_environment_terminated,
};
pub use clients::AwsClients;
pub use cloudcontrol::{RequestStatusPoller, request_status_spec, wait_for_resource_request};
