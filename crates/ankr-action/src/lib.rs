//! Action engine for ankr.
//!
//! Proposes actions from a message analysis, persists them as stateful
//! action calls, and executes them through pluggable executors, either one
//! at a time or in FIFO batches via the pump.

pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod proposal;
pub mod pump;
pub mod types;

pub use error::{ExecutorError, LifecycleError};
pub use handler::{ActionExecutor, ExecutorRegistry};
pub use lifecycle::LifecycleController;
pub use proposal::{preset_actions, ActionProposal, Proposal, ProposalEngine};
pub use pump::{PumpController, PumpItem, PumpReport};
pub use types::{
    ActionName, Analysis, Category, Completion, CompletionStatus, ExecuteOptions,
    FieldOfInterest,
};
