//! Workflow orchestrator: drives select → copy → correct → paste → restore.
//!
//! [`Workflow`] owns the input driver, the clipboard, the corrector and the
//! [`SharedStatus`].  [`Workflow::invoke`] runs one invocation;
//! [`Workflow::run`] calls it for each [`HotkeyEvent`] from the listener.
//!
//! # Invocation flow
//!
//! ```text
//! invoke()
//!   ├─ try-lock invocation guard ── busy ─▶ Skipped
//!   ├─ lease clipboard (snapshot + clear)          [SnapshotSaved]
//!   ├─ select-to-line-start                        [Selected]
//!   ├─ copy, settle                                [Copied]
//!   ├─ read clipboard ── empty ─▶ abort
//!   ├─ corrector.correct under timeout ── err ─▶ abort
//!   ├─ write corrected text                        [Corrected]
//!   ├─ paste, settle                               [Pasted]
//!   └─ release lease (restore clipboard)           [Restored] → Idle
//! ```
//!
//! Every abort still releases the lease, so the clipboard ends up as it
//! started.  Clipboard and key-injection calls run on
//! `tokio::task::spawn_blocking`.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::config::AppConfig;
use crate::hotkey::HotkeyEvent;
use crate::inject::{ClipboardAccess, Gesture, InjectError, InputInjector};
use crate::llm::{CorrectionError, CorrectionResult, Corrector};

use super::lease::ClipboardLease;
use super::state::{new_shared_status, SharedStatus, WorkflowState, WorkflowStatus};

// ---------------------------------------------------------------------------
// WorkflowError
// ---------------------------------------------------------------------------

/// Reasons an invocation ends without replacing the line.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The correction endpoint failed.
    #[error(transparent)]
    Correction(#[from] CorrectionError),

    /// A key gesture or clipboard operation failed.
    #[error(transparent)]
    Inject(#[from] InjectError),

    /// The copy gesture left the clipboard empty.
    #[error("nothing was selected (the focused application did not copy any text)")]
    NothingSelected,

    /// A blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Run a blocking clipboard or input call on the blocking thread pool.
pub(super) async fn blocking<T, F>(f: F) -> Result<T, WorkflowError>
where
    F: FnOnce() -> Result<T, InjectError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WorkflowError::Internal(e.to_string()))?
        .map_err(WorkflowError::from)
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A line that was corrected and pasted back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Text captured from the focused application.
    pub original: String,
    /// What the corrector returned; `corrected.text` was pasted verbatim.
    pub corrected: CorrectionResult,
    /// Set when the line was replaced but the clipboard could not be put
    /// back afterwards.
    pub restore_error: Option<String>,
}

/// Result of one [`Workflow::invoke`] call.
#[derive(Debug)]
pub enum InvocationOutcome {
    Replaced(Replacement),
    Aborted(WorkflowError),
    /// Another invocation held the clipboard; nothing was done.
    Skipped,
}

// ---------------------------------------------------------------------------
// WorkflowOptions
// ---------------------------------------------------------------------------

/// Timing knobs for an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub start_delay: Duration,
    pub copy_settle: Duration,
    pub paste_settle: Duration,
    /// Deadline for the correction call; expiry is `ServiceUnavailable`.
    pub correction_timeout: Duration,
}

impl WorkflowOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            start_delay: Duration::from_millis(config.inject.start_delay_ms),
            copy_settle: Duration::from_millis(config.inject.copy_settle_ms),
            paste_settle: Duration::from_millis(config.inject.paste_settle_ms),
            correction_timeout: config.llm.timeout(),
        }
    }

    /// No settle delays; only the correction deadline applies.
    pub fn immediate(correction_timeout: Duration) -> Self {
        Self {
            start_delay: Duration::ZERO,
            copy_settle: Duration::ZERO,
            paste_settle: Duration::ZERO,
            correction_timeout,
        }
    }
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

struct Inner {
    injector: Arc<dyn InputInjector>,
    clipboard: Arc<dyn ClipboardAccess>,
    corrector: Arc<dyn Corrector>,
    options: WorkflowOptions,
    status: SharedStatus,
    /// Held for the whole of an invocation.
    guard: Mutex<()>,
}

/// The capture-correct-replace orchestrator.
///
/// Cheap to clone; clones share the same invocation guard and status.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use line_corrector::config::AppConfig;
/// use line_corrector::inject::{ArboardClipboard, EnigoInjector};
/// use line_corrector::llm::OllamaCorrector;
/// use line_corrector::workflow::{Workflow, WorkflowOptions};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let workflow = Workflow::new(
///     Arc::new(EnigoInjector::new()),
///     Arc::new(ArboardClipboard::new()),
///     Arc::new(OllamaCorrector::from_config(&config.llm)),
///     WorkflowOptions::from_config(&config),
/// );
/// workflow.invoke().await;
/// # }
/// ```
#[derive(Clone)]
pub struct Workflow {
    inner: Arc<Inner>,
}

impl Workflow {
    pub fn new(
        injector: Arc<dyn InputInjector>,
        clipboard: Arc<dyn ClipboardAccess>,
        corrector: Arc<dyn Corrector>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                injector,
                clipboard,
                corrector,
                options,
                status: new_shared_status(),
                guard: Mutex::new(()),
            }),
        }
    }

    /// Handle to the shared status record.
    pub fn status(&self) -> SharedStatus {
        Arc::clone(&self.inner.status)
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Invoke once per trigger until `events` is closed.
    ///
    /// Triggers that arrive while an invocation is running are discarded
    /// when it finishes rather than replayed.
    pub async fn run(&self, mut events: mpsc::Receiver<HotkeyEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                HotkeyEvent::Triggered => {
                    self.invoke().await;
                }
            }

            let mut dropped = 0u64;
            while events.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                log::info!("workflow: dropped {dropped} trigger(s) received while busy");
                self.update(|st| st.skipped += dropped);
            }
        }

        log::info!("workflow: hotkey channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Invocation
    // -----------------------------------------------------------------------

    /// Run one capture-correct-replace invocation.
    ///
    /// Returns [`InvocationOutcome::Skipped`] immediately if another
    /// invocation is in progress.  Never panics on endpoint or platform
    /// failures; those come back as [`InvocationOutcome::Aborted`].
    pub async fn invoke(&self) -> InvocationOutcome {
        let Ok(_guard) = self.inner.guard.try_lock() else {
            log::info!("workflow: trigger ignored, an invocation is already running");
            self.update(|st| st.skipped += 1);
            return InvocationOutcome::Skipped;
        };

        self.update(WorkflowStatus::begin);

        let outcome = match self.capture_correct_replace().await {
            Ok(replacement) => {
                log::info!(
                    "workflow: replaced {} chars with {} chars",
                    replacement.original.chars().count(),
                    replacement.corrected.text.chars().count()
                );
                let restore_error = replacement.restore_error.clone();
                self.update(|st| {
                    st.completed += 1;
                    if restore_error.is_some() {
                        st.last_error = restore_error;
                    }
                });
                InvocationOutcome::Replaced(replacement)
            }
            Err(e) => {
                log::warn!("workflow: aborted: {e}");
                let message = e.to_string();
                self.update(|st| {
                    st.aborted += 1;
                    st.last_error = Some(message);
                });
                InvocationOutcome::Aborted(e)
            }
        };

        self.enter(WorkflowState::Idle);
        outcome
    }

    async fn capture_correct_replace(&self) -> Result<Replacement, WorkflowError> {
        let options = self.inner.options;
        if !options.start_delay.is_zero() {
            tokio::time::sleep(options.start_delay).await;
        }

        let lease = ClipboardLease::acquire(Arc::clone(&self.inner.clipboard)).await?;
        self.enter(WorkflowState::SnapshotSaved);

        let replaced = self.replace_line().await;

        let restored = lease.release().await;
        self.enter(WorkflowState::Restored);
        if restored.is_err() {
            self.update(|st| st.restore_failures += 1);
        }

        match (replaced, restored) {
            (Ok(replacement), Ok(())) => Ok(replacement),
            (Err(e), Ok(())) => Err(e),
            (Ok(mut replacement), Err(restore_err)) => {
                log::error!("workflow: line replaced but clipboard restore failed: {restore_err}");
                replacement.restore_error = Some(restore_err.to_string());
                Ok(replacement)
            }
            (Err(e), Err(restore_err)) => {
                log::error!("workflow: clipboard restore failed: {restore_err}");
                Err(e)
            }
        }
    }

    /// Steps between snapshot and restore.
    async fn replace_line(&self) -> Result<Replacement, WorkflowError> {
        let options = self.inner.options;

        self.gesture(Gesture::SelectToLineStart).await?;
        self.enter(WorkflowState::Selected);

        self.gesture(Gesture::Copy).await?;
        self.enter(WorkflowState::Copied);
        if !options.copy_settle.is_zero() {
            tokio::time::sleep(options.copy_settle).await;
        }

        let clipboard = Arc::clone(&self.inner.clipboard);
        let selected = blocking(move || clipboard.read_text())
            .await?
            .filter(|text| !text.is_empty())
            .ok_or(WorkflowError::NothingSelected)?;

        log::debug!("workflow: captured {} chars", selected.chars().count());

        let corrected = self.correct(&selected).await?;

        let clipboard = Arc::clone(&self.inner.clipboard);
        let payload = corrected.text.clone();
        blocking(move || clipboard.write_text(&payload)).await?;
        self.enter(WorkflowState::Corrected);

        self.gesture(Gesture::Paste).await?;
        self.enter(WorkflowState::Pasted);
        if !options.paste_settle.is_zero() {
            tokio::time::sleep(options.paste_settle).await;
        }

        Ok(Replacement {
            original: selected,
            corrected,
            restore_error: None,
        })
    }

    async fn correct(&self, text: &str) -> Result<CorrectionResult, WorkflowError> {
        let deadline = self.inner.options.correction_timeout;
        match tokio::time::timeout(deadline, self.inner.corrector.correct(text)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CorrectionError::ServiceUnavailable(format!(
                "no response within {} ms",
                deadline.as_millis()
            ))
            .into()),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn gesture(&self, gesture: Gesture) -> Result<(), WorkflowError> {
        let injector = Arc::clone(&self.inner.injector);
        blocking(move || injector.send(gesture)).await
    }

    fn enter(&self, state: WorkflowState) {
        log::debug!("workflow: → {}", state.label());
        self.update(|st| st.enter(state));
    }

    fn update(&self, f: impl FnOnce(&mut WorkflowStatus)) {
        let mut st = self
            .inner
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut st);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
