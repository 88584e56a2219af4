//! System clipboard backed by the `arboard` crate.
//!
//! Each call opens a short-lived [`arboard::Clipboard`] handle rather than
//! sharing one, because `arboard::Clipboard` is not `Send` on all platforms
//! and the handle is cheap to create.

use arboard::Clipboard;

use super::{ClipboardAccess, InjectError};

/// [`ClipboardAccess`] over the real OS clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArboardClipboard;

impl ArboardClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardAccess for ArboardClipboard {
    fn read_text(&self) -> Result<Option<String>, InjectError> {
        let mut clipboard = open_clipboard()?;
        text_or_none(clipboard.get_text())
    }

    fn write_text(&self, text: &str) -> Result<(), InjectError> {
        let mut clipboard = open_clipboard()?;
        clipboard
            .set_text(text)
            .map_err(|e| InjectError::ClipboardSet(e.to_string()))
    }

    fn clear(&self) -> Result<(), InjectError> {
        let mut clipboard = open_clipboard()?;
        clipboard
            .clear()
            .map_err(|e| InjectError::ClipboardSet(e.to_string()))
    }
}

/// `ContentNotAvailable` (empty, or non-text data) is "no text".  Any other
/// error is a failed read, so the caller never mistakes a busy clipboard for
/// an empty one.
fn text_or_none(result: Result<String, arboard::Error>) -> Result<Option<String>, InjectError> {
    match result {
        Ok(text) => Ok(Some(text)),
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(InjectError::ClipboardAccess(e.to_string())),
    }
}

fn open_clipboard() -> Result<Clipboard, InjectError> {
    Clipboard::new().map_err(|e| InjectError::ClipboardAccess(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_returned() {
        assert_eq!(text_or_none(Ok("hi".into())).unwrap(), Some("hi".into()));
    }

    #[test]
    fn content_not_available_is_no_text() {
        assert_eq!(text_or_none(Err(arboard::Error::ContentNotAvailable)).unwrap(), None);
    }

    #[test]
    fn occupied_clipboard_is_an_error() {
        assert!(matches!(
            text_or_none(Err(arboard::Error::ClipboardOccupied)),
            Err(InjectError::ClipboardAccess(_))
        ));
    }
}
