//! Global hotkey listener, backed by `rdev`.
//!
//! # Design
//!
//! `rdev::grab()` and `rdev::listen()` are blocking OS-level calls that never
//! return while the process is alive.  They must run on a **dedicated OS
//! thread** and cannot be used inside a tokio task.  With the `grab` feature
//! (on by default) the trigger keystroke is swallowed; if the OS refuses the
//! grab, the listener falls back to `listen` and the keystroke also reaches
//! the focused application.
//!
//! [`HotkeyListener::start`] spawns that thread.  Every raw key event is fed
//! through a [`ChordTracker`], which turns the press/release stream into a
//! single [`HotkeyEvent::Triggered`] per press of the configured combination.
//!
//! # Usage
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use line_corrector::hotkey::{HotkeyListener, HotkeySpec};
//!
//! let (tx, mut rx) = mpsc::channel(16);
//! let spec = HotkeySpec::parse("Alt+S").expect("bad hotkey");
//! let _listener = HotkeyListener::start(spec, tx);
//! ```

pub mod chord;
pub mod listener;

pub use chord::{ChordTracker, Interception};
pub use listener::HotkeyListener;

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// HotkeyEvent
// ---------------------------------------------------------------------------

/// Events emitted by the hotkey listener thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// The configured key combination was pressed.
    Triggered,
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// A modifier key, independent of which physical side was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
}

impl Modifier {
    /// Map a physical key to the modifier it represents, if any.
    pub fn from_key(key: rdev::Key) -> Option<Self> {
        match key {
            rdev::Key::ShiftLeft | rdev::Key::ShiftRight => Some(Modifier::Shift),
            rdev::Key::ControlLeft | rdev::Key::ControlRight => Some(Modifier::Control),
            rdev::Key::Alt | rdev::Key::AltGr => Some(Modifier::Alt),
            rdev::Key::MetaLeft | rdev::Key::MetaRight => Some(Modifier::Meta),
            _ => None,
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "shift" => Some(Modifier::Shift),
            "ctrl" | "control" => Some(Modifier::Control),
            "alt" | "option" | "opt" => Some(Modifier::Alt),
            "meta" | "cmd" | "command" | "super" | "win" => Some(Modifier::Meta),
            _ => None,
        }
    }
}

/// The set of modifiers held down at a given moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierSet {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl ModifierSet {
    pub fn set(&mut self, modifier: Modifier, held: bool) {
        match modifier {
            Modifier::Shift => self.shift = held,
            Modifier::Control => self.control = held,
            Modifier::Alt => self.alt = held,
            Modifier::Meta => self.meta = held,
        }
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.set(modifier, true);
        self
    }
}

// ---------------------------------------------------------------------------
// HotkeySpec
// ---------------------------------------------------------------------------

/// Reasons a hotkey string can be rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyParseError {
    #[error("hotkey is empty")]
    Empty,

    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),

    #[error("unknown key {0:?}")]
    UnknownKey(String),

    #[error("hotkey needs a non-modifier key")]
    MissingKey,
}

/// A parsed key combination such as `Alt+S` or `Ctrl+Shift+F9`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotkeySpec {
    pub modifiers: ModifierSet,
    pub key: rdev::Key,
}

impl HotkeySpec {
    /// Parse `Modifier+...+Key`.
    ///
    /// Modifier names are case-insensitive.  The last segment is the key and
    /// is resolved with [`parse_key`].
    ///
    /// ```
    /// use line_corrector::hotkey::{HotkeySpec, ModifierSet, Modifier};
    ///
    /// let spec = HotkeySpec::parse("Option+S").unwrap();
    /// assert_eq!(spec.key, rdev::Key::KeyS);
    /// assert_eq!(spec.modifiers, ModifierSet::default().with(Modifier::Alt));
    /// ```
    pub fn parse(input: &str) -> Result<Self, HotkeyParseError> {
        let parts: Vec<&str> = input
            .split('+')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let Some((key_name, modifier_names)) = parts.split_last() else {
            return Err(HotkeyParseError::Empty);
        };

        let mut modifiers = ModifierSet::default();
        for name in modifier_names {
            let modifier = Modifier::parse(name)
                .ok_or_else(|| HotkeyParseError::UnknownModifier((*name).to_string()))?;
            modifiers.set(modifier, true);
        }

        if Modifier::parse(key_name).is_some() {
            return Err(HotkeyParseError::MissingKey);
        }
        let key =
            parse_key(key_name).ok_or_else(|| HotkeyParseError::UnknownKey((*key_name).to_string()))?;

        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.control {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift+")?;
        }
        if self.modifiers.meta {
            f.write_str("Meta+")?;
        }
        write!(f, "{:?}", self.key)
    }
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a key name from a config string into an [`rdev::Key`].
///
/// Supports F1–F12, common named keys, digits, and single ASCII letters
/// (case-insensitive).  Returns `None` for unrecognised names.
///
/// ```
/// use line_corrector::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"), Some(rdev::Key::F9));
/// assert_eq!(parse_key("s"),  Some(rdev::Key::KeyS));
/// assert_eq!(parse_key("xyz"), None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    let key = match key_str {
        "F1" => rdev::Key::F1,
        "F2" => rdev::Key::F2,
        "F3" => rdev::Key::F3,
        "F4" => rdev::Key::F4,
        "F5" => rdev::Key::F5,
        "F6" => rdev::Key::F6,
        "F7" => rdev::Key::F7,
        "F8" => rdev::Key::F8,
        "F9" => rdev::Key::F9,
        "F10" => rdev::Key::F10,
        "F11" => rdev::Key::F11,
        "F12" => rdev::Key::F12,

        "Escape" | "Esc" => rdev::Key::Escape,
        "Space" => rdev::Key::Space,
        "Return" | "Enter" => rdev::Key::Return,
        "Tab" => rdev::Key::Tab,
        "Backspace" => rdev::Key::Backspace,
        "Delete" | "Del" => rdev::Key::Delete,
        "Home" => rdev::Key::Home,
        "End" => rdev::Key::End,
        "PageUp" => rdev::Key::PageUp,
        "PageDown" => rdev::Key::PageDown,
        "Insert" => rdev::Key::Insert,
        "Pause" => rdev::Key::Pause,

        "0" => rdev::Key::Num0,
        "1" => rdev::Key::Num1,
        "2" => rdev::Key::Num2,
        "3" => rdev::Key::Num3,
        "4" => rdev::Key::Num4,
        "5" => rdev::Key::Num5,
        "6" => rdev::Key::Num6,
        "7" => rdev::Key::Num7,
        "8" => rdev::Key::Num8,
        "9" => rdev::Key::Num9,

        letter if letter.len() == 1 => return parse_letter(letter.as_bytes()[0]),
        _ => return None,
    };
    Some(key)
}

fn parse_letter(byte: u8) -> Option<rdev::Key> {
    let key = match byte.to_ascii_uppercase() {
        b'A' => rdev::Key::KeyA,
        b'B' => rdev::Key::KeyB,
        b'C' => rdev::Key::KeyC,
        b'D' => rdev::Key::KeyD,
        b'E' => rdev::Key::KeyE,
        b'F' => rdev::Key::KeyF,
        b'G' => rdev::Key::KeyG,
        b'H' => rdev::Key::KeyH,
        b'I' => rdev::Key::KeyI,
        b'J' => rdev::Key::KeyJ,
        b'K' => rdev::Key::KeyK,
        b'L' => rdev::Key::KeyL,
        b'M' => rdev::Key::KeyM,
        b'N' => rdev::Key::KeyN,
        b'O' => rdev::Key::KeyO,
        b'P' => rdev::Key::KeyP,
        b'Q' => rdev::Key::KeyQ,
        b'R' => rdev::Key::KeyR,
        b'S' => rdev::Key::KeyS,
        b'T' => rdev::Key::KeyT,
        b'U' => rdev::Key::KeyU,
        b'V' => rdev::Key::KeyV,
        b'W' => rdev::Key::KeyW,
        b'X' => rdev::Key::KeyX,
        b'Y' => rdev::Key::KeyY,
        b'Z' => rdev::Key::KeyZ,
        _ => return None,
    };
    Some(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
