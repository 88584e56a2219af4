//! Turns the raw press/release stream into hotkey triggers.

use super::{HotkeySpec, Modifier, ModifierSet};

/// What a grabbing hook should do with one raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Deliver the event to the focused application.
    Pass,
    /// Drop the event.
    Swallow,
    /// Drop the event; the hotkey fired.
    Fire,
}

/// Tracks held modifiers and the trigger key across raw key events.
///
/// Fires once when the trigger key goes down while exactly the configured
/// modifiers are held.  OS auto-repeat delivers repeated presses without a
/// release in between; those do not fire again.
#[derive(Debug)]
pub struct ChordTracker {
    spec: HotkeySpec,
    held: ModifierSet,
    key_down: bool,
    /// The trigger key went down as part of a fired chord and has not been
    /// released yet.
    swallowing: bool,
}

impl ChordTracker {
    pub fn new(spec: HotkeySpec) -> Self {
        Self {
            spec,
            held: ModifierSet::default(),
            key_down: false,
            swallowing: false,
        }
    }

    /// Feed a key press.  Returns `true` when the hotkey fires.
    pub fn press(&mut self, key: rdev::Key) -> bool {
        if let Some(modifier) = Modifier::from_key(key) {
            self.held.set(modifier, true);
            return false;
        }
        if key != self.spec.key {
            return false;
        }
        if self.key_down {
            return false;
        }
        self.key_down = true;
        self.held == self.spec.modifiers
    }

    /// Feed a key release.
    pub fn release(&mut self, key: rdev::Key) {
        if let Some(modifier) = Modifier::from_key(key) {
            self.held.set(modifier, false);
        } else if key == self.spec.key {
            self.key_down = false;
        }
    }

    /// Feed any `rdev` event.  Returns `true` when the hotkey fires.
    pub fn handle(&mut self, event: &rdev::EventType) -> bool {
        self.intercept(event) == Interception::Fire
    }

    /// Feed any `rdev` event and decide whether it may reach the focused
    /// application.
    ///
    /// The press that fires the hotkey is swallowed, together with its
    /// auto-repeats and its release.  Modifier events always pass, so the
    /// application never sees a modifier stuck down.
    pub fn intercept(&mut self, event: &rdev::EventType) -> Interception {
        match *event {
            rdev::EventType::KeyPress(key) => {
                if self.swallowing && key == self.spec.key {
                    Interception::Swallow
                } else if self.press(key) {
                    self.swallowing = true;
                    Interception::Fire
                } else {
                    Interception::Pass
                }
            }
            rdev::EventType::KeyRelease(key) => {
                self.release(key);
                if self.swallowing && key == self.spec.key {
                    self.swallowing = false;
                    Interception::Swallow
                } else {
                    Interception::Pass
                }
            }
            _ => Interception::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::Key;

    fn alt_s() -> ChordTracker {
        ChordTracker::new(HotkeySpec::parse("Alt+S").unwrap())
    }

    #[test]
    fn fires_when_modifier_held() {
        let mut t = alt_s();
        assert!(!t.press(Key::Alt));
        assert!(t.press(Key::KeyS));
    }

    #[test]
    fn does_not_fire_without_modifier() {
        let mut t = alt_s();
        assert!(!t.press(Key::KeyS));
    }

    #[test]
    fn does_not_fire_with_extra_modifier() {
        let mut t = alt_s();
        t.press(Key::Alt);
        t.press(Key::ShiftLeft);
        assert!(!t.press(Key::KeyS));
    }

    #[test]
    fn auto_repeat_fires_once() {
        let mut t = alt_s();
        t.press(Key::Alt);
        assert!(t.press(Key::KeyS));
        assert!(!t.press(Key::KeyS));
        assert!(!t.press(Key::KeyS));

        t.release(Key::KeyS);
        assert!(t.press(Key::KeyS));
    }

    #[test]
    fn releasing_modifier_disarms() {
        let mut t = alt_s();
        t.press(Key::Alt);
        t.release(Key::Alt);
        assert!(!t.press(Key::KeyS));
    }

    #[test]
    fn either_side_of_a_modifier_counts() {
        let mut t = ChordTracker::new(HotkeySpec::parse("Ctrl+Shift+G").unwrap());
        t.press(Key::ControlRight);
        t.press(Key::ShiftLeft);
        assert!(t.press(Key::KeyG));
    }

    #[test]
    fn handle_ignores_mouse_events() {
        let mut t = alt_s();
        assert!(!t.handle(&rdev::EventType::KeyPress(Key::Alt)));
        assert!(!t.handle(&rdev::EventType::MouseMove { x: 1.0, y: 2.0 }));
        assert!(t.handle(&rdev::EventType::KeyPress(Key::KeyS)));
        assert!(!t.handle(&rdev::EventType::KeyRelease(Key::KeyS)));
    }

    #[test]
    fn fired_key_is_swallowed_until_released() {
        use rdev::EventType::{KeyPress, KeyRelease};

        let mut t = alt_s();
        assert_eq!(t.intercept(&KeyPress(Key::Alt)), Interception::Pass);
        assert_eq!(t.intercept(&KeyPress(Key::KeyS)), Interception::Fire);
        assert_eq!(t.intercept(&KeyPress(Key::KeyS)), Interception::Swallow);
        assert_eq!(t.intercept(&KeyRelease(Key::KeyS)), Interception::Swallow);
        assert_eq!(t.intercept(&KeyRelease(Key::Alt)), Interception::Pass);
    }

    #[test]
    fn unfired_key_passes_through() {
        use rdev::EventType::{KeyPress, KeyRelease};

        let mut t = alt_s();
        assert_eq!(t.intercept(&KeyPress(Key::KeyS)), Interception::Pass);
        assert_eq!(t.intercept(&KeyRelease(Key::KeyS)), Interception::Pass);
        assert_eq!(t.intercept(&KeyPress(Key::KeyA)), Interception::Pass);
    }

    #[test]
    fn releasing_modifier_first_still_swallows_key_release() {
        use rdev::EventType::{KeyPress, KeyRelease};

        let mut t = alt_s();
        t.intercept(&KeyPress(Key::Alt));
        assert_eq!(t.intercept(&KeyPress(Key::KeyS)), Interception::Fire);
        assert_eq!(t.intercept(&KeyRelease(Key::Alt)), Interception::Pass);
        assert_eq!(t.intercept(&KeyRelease(Key::KeyS)), Interception::Swallow);
        assert_eq!(t.intercept(&KeyPress(Key::KeyS)), Interception::Pass);
    }
}
