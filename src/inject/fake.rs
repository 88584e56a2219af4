//! In-memory stand-in for the OS input queue and clipboard.
//!
//! [`FakeDesktop`] models a focused application holding one line of text with
//! the caret at its end, plus a clipboard.  Gestures act on that text the way
//! a typical editor does, and every gesture and clipboard call is appended to
//! an ordered event log so tests can assert on sequencing.

use std::sync::{Arc, Mutex, PoisonError};

use super::{ClipboardAccess, Gesture, InjectError, InputInjector};

/// One entry in the [`FakeDesktop`] event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopEvent {
    Gesture(Gesture),
    ClipboardRead,
    ClipboardWrite(String),
    ClipboardClear,
    /// Free-form marker pushed by other test doubles (e.g. a corrector).
    Marker(&'static str),
}

#[derive(Debug, Default)]
struct Inner {
    text: String,
    caret: usize,
    selection: Option<(usize, usize)>,
    clipboard: Option<String>,
    events: Vec<DesktopEvent>,
    copy_ignored: bool,
    keyboard_denied: bool,
    reads_fail: bool,
    clears_fail: bool,
    writes: WriteFailure,
    write_attempts: usize,
}

/// Which clipboard writes fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum WriteFailure {
    #[default]
    None,
    All,
    /// Only the write with this 1-based index.
    Nth(usize),
}

/// Cheaply cloneable handle; clones share the same desktop.
#[derive(Debug, Clone, Default)]
pub struct FakeDesktop {
    inner: Arc<Mutex<Inner>>,
}

impl FakeDesktop {
    /// A focused line holding `text` with the caret at its end, and the
    /// clipboard holding `clipboard`.
    pub fn new(text: &str, clipboard: Option<&str>) -> Self {
        let inner = Inner {
            text: text.to_string(),
            caret: text.len(),
            clipboard: clipboard.map(str::to_string),
            ..Inner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// The focused application ignores the copy gesture (e.g. a secure
    /// field).  The gesture itself still "succeeds".
    pub fn ignoring_copy(self) -> Self {
        self.lock().copy_ignored = true;
        self
    }

    /// Every gesture fails as if synthetic input were not permitted.
    pub fn denying_keyboard(self) -> Self {
        self.lock().keyboard_denied = true;
        self
    }

    /// Every clipboard read fails.
    pub fn failing_clipboard_reads(self) -> Self {
        self.lock().reads_fail = true;
        self
    }

    /// Every clipboard clear fails.
    pub fn failing_clipboard_clears(self) -> Self {
        self.lock().clears_fail = true;
        self
    }

    /// Every clipboard write fails.
    pub fn failing_clipboard_writes(self) -> Self {
        self.lock().writes = WriteFailure::All;
        self
    }

    /// Only the `nth` clipboard write (counting from 1) fails.
    pub fn failing_clipboard_write(self, nth: usize) -> Self {
        self.lock().writes = WriteFailure::Nth(nth);
        self
    }

    /// Current content of the focused line.
    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    /// Current clipboard content.
    pub fn clipboard(&self) -> Option<String> {
        self.lock().clipboard.clone()
    }

    /// Every recorded event, oldest first.
    pub fn events(&self) -> Vec<DesktopEvent> {
        self.lock().events.clone()
    }

    /// Only the gestures, oldest first.
    pub fn gestures(&self) -> Vec<Gesture> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                DesktopEvent::Gesture(g) => Some(*g),
                _ => None,
            })
            .collect()
    }

    pub fn mark(&self, label: &'static str) {
        self.lock().events.push(DesktopEvent::Marker(label));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InputInjector for FakeDesktop {
    fn send(&self, gesture: Gesture) -> Result<(), InjectError> {
        let mut inner = self.lock();
        if inner.keyboard_denied {
            return Err(InjectError::KeySimulation(format!(
                "{gesture}: synthetic input not permitted"
            )));
        }
        inner.events.push(DesktopEvent::Gesture(gesture));

        match gesture {
            Gesture::SelectToLineStart => {
                let caret = inner.caret;
                inner.selection = Some((0, caret));
            }
            Gesture::Copy => {
                if inner.copy_ignored {
                    return Ok(());
                }
                // Copy with nothing selected leaves the clipboard alone.
                if let Some((start, end)) = inner.selection {
                    let selected = inner.text[start..end].to_string();
                    inner.clipboard = Some(selected);
                }
            }
            Gesture::Paste => {
                let Some(pasted) = inner.clipboard.clone() else {
                    return Ok(());
                };
                let (start, end) = inner.selection.take().unwrap_or((inner.caret, inner.caret));
                inner.text.replace_range(start..end, &pasted);
                inner.caret = start + pasted.len();
            }
        }
        Ok(())
    }
}

impl ClipboardAccess for FakeDesktop {
    fn read_text(&self) -> Result<Option<String>, InjectError> {
        let mut inner = self.lock();
        if inner.reads_fail {
            return Err(InjectError::ClipboardAccess("clipboard busy".into()));
        }
        inner.events.push(DesktopEvent::ClipboardRead);
        Ok(inner.clipboard.clone())
    }

    fn write_text(&self, text: &str) -> Result<(), InjectError> {
        let mut inner = self.lock();
        inner.write_attempts += 1;
        let fails = match inner.writes {
            WriteFailure::None => false,
            WriteFailure::All => true,
            WriteFailure::Nth(n) => n == inner.write_attempts,
        };
        if fails {
            return Err(InjectError::ClipboardSet("clipboard write rejected".into()));
        }
        inner.events.push(DesktopEvent::ClipboardWrite(text.to_string()));
        inner.clipboard = Some(text.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), InjectError> {
        let mut inner = self.lock();
        if inner.clears_fail {
            return Err(InjectError::ClipboardSet("clipboard clear rejected".into()));
        }
        inner.events.push(DesktopEvent::ClipboardClear);
        inner.clipboard = None;
        Ok(())
    }
}
