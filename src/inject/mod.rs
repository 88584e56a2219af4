//! Synthetic input driver: key gestures and clipboard access.
//!
//! # Overview
//!
//! The only reliable way to pull text out of an arbitrary foreground
//! application is "select, simulate copy, read the clipboard", and the only
//! reliable way to put it back is "write the clipboard, simulate paste".
//! This module exposes those primitives behind two capability traits:
//!
//! * [`InputInjector`]: emits the three [`Gesture`]s the workflow needs.
//! * [`ClipboardAccess`]: plain-text read / write / clear.
//!
//! Real backends are [`EnigoInjector`] and [`ArboardClipboard`].
//! `FakeDesktop` (behind the `test-util` feature) implements both against an
//! in-memory text field for tests.
//!
//! Gestures are fire-and-forget: the OS gives no acknowledgement that the
//! focused application acted on them.

pub mod clipboard;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod keyboard;

pub use clipboard::ArboardClipboard;
#[cfg(any(test, feature = "test-util"))]
pub use fake::{DesktopEvent, FakeDesktop};
pub use keyboard::EnigoInjector;

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// InjectError
// ---------------------------------------------------------------------------

/// Platform-level failures of synthetic input or clipboard I/O.
#[derive(Debug, Error)]
pub enum InjectError {
    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not write to or clear the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    ClipboardSet(String),

    /// Could not simulate a key press/release event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),
}

// ---------------------------------------------------------------------------
// Gesture
// ---------------------------------------------------------------------------

/// Keyboard gestures the workflow emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Shift+Home: extend the selection from the caret to the line start.
    SelectToLineStart,
    /// Platform copy chord.
    Copy,
    /// Platform paste chord.
    Paste,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gesture::SelectToLineStart => "select-to-line-start",
            Gesture::Copy => "copy",
            Gesture::Paste => "paste",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Emits keyboard gestures into whichever application has focus.
///
/// Implementations must release every key they press, including when a
/// later key event in the same chord fails.
pub trait InputInjector: Send + Sync {
    fn send(&self, gesture: Gesture) -> Result<(), InjectError>;

    fn select_to_line_start(&self) -> Result<(), InjectError> {
        self.send(Gesture::SelectToLineStart)
    }

    fn copy_selection(&self) -> Result<(), InjectError> {
        self.send(Gesture::Copy)
    }

    fn paste_clipboard(&self) -> Result<(), InjectError> {
        self.send(Gesture::Paste)
    }
}

/// Plain-text access to the process-wide system clipboard.
pub trait ClipboardAccess: Send + Sync {
    /// Current text content, or `None` when the clipboard is empty or holds
    /// non-text data.
    fn read_text(&self) -> Result<Option<String>, InjectError>;

    fn write_text(&self, text: &str) -> Result<(), InjectError>;

    fn clear(&self) -> Result<(), InjectError>;
}
