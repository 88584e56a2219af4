//! Capture-correct-replace orchestration.
//!
//! * [`Workflow`]: runs one invocation per hotkey trigger.
//! * [`ClipboardLease`]: snapshot/clear on acquire, restore on release or drop.
//! * [`WorkflowState`] / [`WorkflowStatus`]: observable progress and counters.

pub mod lease;
pub mod runner;
pub mod state;

pub use lease::{ClipboardLease, ClipboardSnapshot};
pub use runner::{InvocationOutcome, Replacement, Workflow, WorkflowError, WorkflowOptions};
pub use state::{new_shared_status, SharedStatus, WorkflowState, WorkflowStatus};
