//! Window-system independent input events.

use bitflags::bitflags;

/// Keyboard keys the framework distinguishes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Key0, Key1, Key2, Key3, Key4, Key5, Key6, Key7, Key8, Key9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Space,
    Tab,
    Enter,
    Escape,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Unknown,
}

impl Key {
    /// Returns the digit of a number-row key.
    pub fn digit(self) -> Option<u8> {
        let digit = match self {
            Key::Key0 => 0,
            Key::Key1 => 1,
            Key::Key2 => 2,
            Key::Key3 => 3,
            Key::Key4 => 4,
            Key::Key5 => 5,
            Key::Key6 => 6,
            Key::Key7 => 7,
            Key::Key8 => 8,
            Key::Key9 => 9,
            _ => return None,
        };
        Some(digit)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MouseButtonAction {
    Press,
    Release,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Mods: u8 {
        const SHIFT = 0b0001;
        const CONTROL = 0b0010;
        const ALT = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Mods {
    pub fn shift(self) -> bool {
        self.contains(Mods::SHIFT)
    }

    pub fn control(self) -> bool {
        self.contains(Mods::CONTROL)
    }

    pub fn alt(self) -> bool {
        self.contains(Mods::ALT)
    }
}

/// One input or window event, in window pixel coordinates with the origin
/// at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Key { key: Key, action: KeyAction, mods: Mods },
    MouseButton { button: MouseButton, action: MouseButtonAction, mods: Mods },
    CursorMoved { x: f64, y: f64 },
    Resized { width: u32, height: u32 },
    CloseRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits() {
        assert_eq!(Key::Key0.digit(), Some(0));
        assert_eq!(Key::Key7.digit(), Some(7));
        assert_eq!(Key::A.digit(), None);
    }

    #[test]
    fn modifier_queries() {
        let mods = Mods::CONTROL | Mods::SHIFT;
        assert!(mods.control());
        assert!(mods.shift());
        assert!(!mods.alt());
        assert!(!Mods::empty().control());
    }
}
