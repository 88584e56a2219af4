//! Workflow state machine and shared status.
//!
//! [`WorkflowState`] is the orchestrator's position within one invocation.
//! [`WorkflowStatus`] is what the host (and tests) can observe from outside:
//! the current state, the states visited by the latest invocation, and
//! counters.  [`SharedStatus`] is `Arc<Mutex<WorkflowStatus>>`.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

/// States of one capture-correct-replace invocation.
///
/// ```text
/// Idle ─▶ SnapshotSaved ─▶ Selected ─▶ Copied ─▶ Corrected ─▶ Pasted ─▶ Restored ─▶ Idle
///               │              │          │
///               └──────────────┴──────────┴──── failure ───────────────▶ Restored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// Waiting for a hotkey trigger.
    #[default]
    Idle,
    /// Original clipboard captured and the clipboard cleared.
    SnapshotSaved,
    /// Select-to-line-start gesture sent.
    Selected,
    /// Copy gesture sent.
    Copied,
    /// Corrected text received and written to the clipboard.
    Corrected,
    /// Paste gesture sent.
    Pasted,
    /// Original clipboard written back.
    Restored,
}

impl WorkflowState {
    /// `true` from the moment the clipboard is borrowed until it is returned.
    pub fn holds_clipboard(&self) -> bool {
        !matches!(self, WorkflowState::Idle | WorkflowState::Restored)
    }

    /// A short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::SnapshotSaved => "snapshot-saved",
            WorkflowState::Selected => "selected",
            WorkflowState::Copied => "copied",
            WorkflowState::Corrected => "corrected",
            WorkflowState::Pasted => "pasted",
            WorkflowState::Restored => "restored",
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowStatus
// ---------------------------------------------------------------------------

/// Externally visible record of what the orchestrator is doing and has done.
#[derive(Debug, Clone, Default)]
pub struct WorkflowStatus {
    /// Current state.
    pub state: WorkflowState,
    /// Every state entered by the latest invocation, in order.
    pub trace: Vec<WorkflowState>,
    /// Invocations that pasted corrected text.
    pub completed: u64,
    /// Invocations that ended early on an error.
    pub aborted: u64,
    /// Triggers dropped because an invocation was already running.
    pub skipped: u64,
    /// Invocations whose clipboard could not be put back.  A completed
    /// invocation counted here still replaced the line.
    pub restore_failures: u64,
    /// Message of the most recent abort or restore failure.
    pub last_error: Option<String>,
}

impl WorkflowStatus {
    pub(crate) fn begin(&mut self) {
        self.trace.clear();
        self.state = WorkflowState::Idle;
    }

    pub(crate) fn enter(&mut self, state: WorkflowState) {
        self.state = state;
        self.trace.push(state);
    }
}

/// Thread-safe handle to [`WorkflowStatus`].
///
/// Lock for a short critical section only; never across an `.await`.
pub type SharedStatus = Arc<Mutex<WorkflowStatus>>;

pub fn new_shared_status() -> SharedStatus {
    Arc::new(Mutex::new(WorkflowStatus::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
