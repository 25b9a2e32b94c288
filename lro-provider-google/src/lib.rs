//! Lro Google Provider
//!
//! Waits for Compute Engine operations.
//!
//! ## Module Structure
//!
//! - `config` - Project, API version and endpoint settings
//! - `client` - Thin REST client for the operations endpoints
//! - `operation` - Compute `Operation` resource
//! - `poller` - Poller bound to a global, regional or zonal operation
//! - `wait` - Wait presets used by Compute resources

pub mod client;
pub mod config;
pub mod operation;
pub mod poller;
pub mod wait;

// Re-export main types
pub use client::ComputeClient;
pub use config::{ApiVersion, ComputeConfig};
pub use operation::Operation;
pub use poller::{ComputeOperationPoller, OperationEndpoint};
pub use wait::{
    compute_operation_wait, compute_operation_wait_time, compute_operation_wait_with_spec,
    compute_wait_spec, compute_wait_time_spec,
};
