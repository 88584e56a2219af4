//! Keyboard simulation backed by the `enigo` crate.
//!
//! | Gesture             | macOS   | Windows / Linux |
//! |---------------------|---------|-----------------|
//! | select-to-line-start| ⇧Home   | Shift+Home      |
//! | copy                | ⌘C      | Ctrl+C          |
//! | paste               | ⌘V      | Ctrl+V          |

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::{Gesture, InjectError, InputInjector};

#[cfg(target_os = "macos")]
const COMMAND_MODIFIER: Key = Key::Meta;

#[cfg(not(target_os = "macos"))]
const COMMAND_MODIFIER: Key = Key::Control;

/// [`InputInjector`] that drives the real OS input queue.
///
/// A new [`Enigo`] instance is created for each gesture because `Enigo` is
/// not `Send` and the handle is cheap to construct.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnigoInjector;

impl EnigoInjector {
    pub fn new() -> Self {
        Self
    }
}

impl InputInjector for EnigoInjector {
    fn send(&self, gesture: Gesture) -> Result<(), InjectError> {
        let mut enigo = Enigo::new(&Settings::default()).map_err(key_error)?;
        let (modifier, key) = chord_for(gesture);
        chord(
            |k, direction| enigo.key(k, direction).map_err(key_error),
            modifier,
            key,
        )
    }
}

/// Modifier and key making up each gesture.
pub fn chord_for(gesture: Gesture) -> (Key, Key) {
    match gesture {
        Gesture::SelectToLineStart => (Key::Shift, Key::Home),
        Gesture::Copy => (COMMAND_MODIFIER, Key::Unicode('c')),
        Gesture::Paste => (COMMAND_MODIFIER, Key::Unicode('v')),
    }
}

/// Press `modifier`, click `key`, release `modifier`.
///
/// The release is sent even when the click fails so no modifier is left
/// stuck down in the user's session.  The first error wins.
fn chord<F>(mut emit: F, modifier: Key, key: Key) -> Result<(), InjectError>
where
    F: FnMut(Key, Direction) -> Result<(), InjectError>,
{
    emit(modifier, Direction::Press)?;
    let clicked = emit(key, Direction::Click);
    let released = emit(modifier, Direction::Release);
    clicked.and(released)
}

fn key_error(e: impl std::fmt::Display) -> InjectError {
    InjectError::KeySimulation(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_uses_shift_home() {
        assert_eq!(chord_for(Gesture::SelectToLineStart), (Key::Shift, Key::Home));
    }

    #[test]
    fn copy_and_paste_share_the_command_modifier() {
        let (copy_mod, copy_key) = chord_for(Gesture::Copy);
        let (paste_mod, paste_key) = chord_for(Gesture::Paste);
        assert_eq!(copy_mod, paste_mod);
        assert_eq!(copy_key, Key::Unicode('c'));
        assert_eq!(paste_key, Key::Unicode('v'));
    }

    #[test]
    fn chord_releases_modifier_after_click() {
        let mut sent = Vec::new();
        chord(
            |k, d| {
                sent.push((k, d));
                Ok(())
            },
            Key::Shift,
            Key::Home,
        )
        .unwrap();

        assert_eq!(
            sent,
            vec![
                (Key::Shift, Direction::Press),
                (Key::Home, Direction::Click),
                (Key::Shift, Direction::Release),
            ]
        );
    }

    #[test]
    fn chord_releases_modifier_when_click_fails() {
        let mut sent = Vec::new();
        let result = chord(
            |k, d| {
                sent.push((k, d));
                if d == Direction::Click {
                    Err(InjectError::KeySimulation("denied".into()))
                } else {
                    Ok(())
                }
            },
            Key::Control,
            Key::Unicode('c'),
        );

        assert!(matches!(result, Err(InjectError::KeySimulation(_))));
        assert_eq!(sent.last(), Some(&(Key::Control, Direction::Release)));
    }

    #[test]
    fn chord_sends_nothing_else_when_press_fails() {
        let mut sent = Vec::new();
        let result = chord(
            |k, d| {
                sent.push((k, d));
                Err(InjectError::KeySimulation("no access".into()))
            },
            Key::Control,
            Key::Unicode('v'),
        );

        assert!(result.is_err());
        assert_eq!(sent, vec![(Key::Control, Direction::Press)]);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn macos_uses_command() {
        assert_eq!(chord_for(Gesture::Copy).0, Key::Meta);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn other_platforms_use_control() {
        assert_eq!(chord_for(Gesture::Copy).0, Key::Control);
    }
}
