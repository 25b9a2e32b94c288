//! Lro Core
//!
//! Waits for asynchronous cloud operations to reach a terminal state.
//!
//! ## Module Structure
//!
//! - `operation` - Operation handles and their scope (global/regional/zonal)
//! - `spec` - Pending/target status vocabularies and poll timing
//! - `poller` - Trait for fetching the current status of one operation
//! - `engine` - The polling state machine
//! - `error` - Wait errors and vendor error payload normalization

pub mod engine;
pub mod error;
pub mod operation;
pub mod poller;
pub mod spec;

pub use engine::{
    WaitEngine, WaitState, wait_for_operation, wait_for_operation_with_cancellation,
};
pub use error::{OperationError, OperationErrorEntry, WaitError};
pub use operation::{HandleError, OperationHandle, OperationScope};
pub use poller::{BoxFuture, PollError, PollResult, Poller};
pub use spec::{SpecError, StatusClass, WaitSpec};

pub use tokio_util::sync::CancellationToken;
