//! Virtual key codes and key naming
//!
//! Codes follow the virtual-key numbering used by browsers and Windows
//! (`keyCode`), which is what keyboard-emulating barcode scanners end up
//! producing: digits are 48-57, letters 65-90, keypad digits 96-105 and
//! keypad operators 106-111.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

/// Represents a virtual key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(8);
    pub const TAB: KeyCode = KeyCode(9);
    pub const ENTER: KeyCode = KeyCode(13);
    pub const SHIFT: KeyCode = KeyCode(16);
    pub const CONTROL: KeyCode = KeyCode(17);
    pub const ALT: KeyCode = KeyCode(18);
    pub const CAPS_LOCK: KeyCode = KeyCode(20);
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(32);
    pub const F1: KeyCode = KeyCode(112);

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Digits `0`-`9` and letters `A`-`Z` (plus the few codes in between)
    pub fn is_alphanumeric(&self) -> bool {
        ALPHANUMERIC.contains(&self.0)
    }

    /// Numeric keypad `0`-`9`
    pub fn is_keypad_digit(&self) -> bool {
        KEYPAD_DIGITS.contains(&self.0)
    }

    /// Numeric keypad `*`, `+`, separator, `-`, `.` and `/`
    pub fn is_keypad_operator(&self) -> bool {
        KEYPAD_OPERATORS.contains(&self.0)
    }

    /// Human readable name, for logs and diagnostics
    pub fn name(&self) -> &'static str {
        key_name(*self)
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

pub(crate) const ALPHANUMERIC: RangeInclusive<u16> = 48..=90;
pub(crate) const KEYPAD_DIGITS: RangeInclusive<u16> = 96..=105;
pub(crate) const KEYPAD_OPERATORS: RangeInclusive<u16> = 106..=111;

impl From<device_query::Keycode> for KeyCode {
    fn from(keycode: device_query::Keycode) -> Self {
        use device_query::Keycode as DK;
        let code = match keycode {
            DK::Backspace => 8,
            DK::Tab => 9,
            DK::Enter => 13,
            DK::LShift | DK::RShift => 16,
            DK::LControl | DK::RControl => 17,
            DK::LAlt | DK::RAlt => 18,
            DK::CapsLock => 20,
            DK::Escape => 27,
            DK::Space => 32,
            DK::PageUp => 33,
            DK::PageDown => 34,
            DK::End => 35,
            DK::Home => 36,
            DK::Left => 37,
            DK::Up => 38,
            DK::Right => 39,
            DK::Down => 40,
            DK::Insert => 45,
            DK::Delete => 46,
            DK::Key0 => 48,
            DK::Key1 => 49,
            DK::Key2 => 50,
            DK::Key3 => 51,
            DK::Key4 => 52,
            DK::Key5 => 53,
            DK::Key6 => 54,
            DK::Key7 => 55,
            DK::Key8 => 56,
            DK::Key9 => 57,
            DK::A => 65,
            DK::B => 66,
            DK::C => 67,
            DK::D => 68,
            DK::E => 69,
            DK::F => 70,
            DK::G => 71,
            DK::H => 72,
            DK::I => 73,
            DK::J => 74,
            DK::K => 75,
            DK::L => 76,
            DK::M => 77,
            DK::N => 78,
            DK::O => 79,
            DK::P => 80,
            DK::Q => 81,
            DK::R => 82,
            DK::S => 83,
            DK::T => 84,
            DK::U => 85,
            DK::V => 86,
            DK::W => 87,
            DK::X => 88,
            DK::Y => 89,
            DK::Z => 90,
            DK::LMeta => 91,
            DK::RMeta => 92,
            DK::Numpad0 => 96,
            DK::Numpad1 => 97,
            DK::Numpad2 => 98,
            DK::Numpad3 => 99,
            DK::Numpad4 => 100,
            DK::Numpad5 => 101,
            DK::Numpad6 => 102,
            DK::Numpad7 => 103,
            DK::Numpad8 => 104,
            DK::Numpad9 => 105,
            DK::NumpadMultiply => 106,
            DK::NumpadAdd => 107,
            DK::NumpadSubtract => 109,
            DK::NumpadDivide => 111,
            DK::F1 => 112,
            DK::F2 => 113,
            DK::F3 => 114,
            DK::F4 => 115,
            DK::F5 => 116,
            DK::F6 => 117,
            DK::F7 => 118,
            DK::F8 => 119,
            DK::F9 => 120,
            DK::F10 => 121,
            DK::F11 => 122,
            DK::F12 => 123,
            DK::Semicolon => 186,
            DK::Equal => 187,
            DK::Comma => 188,
            DK::Minus => 189,
            DK::Dot => 190,
            DK::Slash => 191,
            DK::Grave => 192,
            DK::LeftBracket => 219,
            DK::BackSlash => 220,
            DK::RightBracket => 221,
            DK::Apostrophe => 222,
            // Fallback for any unmapped keys
            _ => 0,
        };
        Self(code)
    }
}

/// Virtual key code for a printable US-layout character, if it has one.
///
/// Used by event sources that only know the produced character (terminals).
pub fn code_for_char(c: char) -> Option<KeyCode> {
    let code = match c {
        '0'..='9' => c as u16,
        'a'..='z' => c.to_ascii_uppercase() as u16,
        'A'..='Z' => c as u16,
        ' ' => 32,
        ')' => 48,
        '!' => 49,
        '@' => 50,
        '#' => 51,
        '$' => 52,
        '%' => 53,
        '^' => 54,
        '&' => 55,
        '*' => 56,
        '(' => 57,
        ';' | ':' => 186,
        '=' | '+' => 187,
        ',' | '<' => 188,
        '-' | '_' => 189,
        '.' | '>' => 190,
        '/' | '?' => 191,
        '`' | '~' => 192,
        '[' | '{' => 219,
        '\\' | '|' => 220,
        ']' | '}' => 221,
        '\'' | '"' => 222,
        _ => return None,
    };
    Some(KeyCode(code))
}

/// Names for the non-alphanumeric keys
static KEY_NAMES: LazyLock<HashMap<KeyCode, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert(KeyCode(8), "Backspace");
    map.insert(KeyCode(9), "Tab");
    map.insert(KeyCode(13), "Enter");
    map.insert(KeyCode(16), "Shift");
    map.insert(KeyCode(17), "Ctrl");
    map.insert(KeyCode(18), "Alt");
    map.insert(KeyCode(19), "Pause");
    map.insert(KeyCode(20), "CapsLock");
    map.insert(KeyCode(27), "Escape");
    map.insert(KeyCode(32), "Space");
    map.insert(KeyCode(33), "PageUp");
    map.insert(KeyCode(34), "PageDown");
    map.insert(KeyCode(35), "End");
    map.insert(KeyCode(36), "Home");
    map.insert(KeyCode(37), "Left");
    map.insert(KeyCode(38), "Up");
    map.insert(KeyCode(39), "Right");
    map.insert(KeyCode(40), "Down");
    map.insert(KeyCode(45), "Insert");
    map.insert(KeyCode(46), "Delete");
    map.insert(KeyCode(91), "LeftMeta");
    map.insert(KeyCode(92), "RightMeta");
    map.insert(KeyCode(93), "Menu");

    // Keypad
    map.insert(KeyCode(106), "KeypadMultiply");
    map.insert(KeyCode(107), "KeypadAdd");
    map.insert(KeyCode(108), "KeypadSeparator");
    map.insert(KeyCode(109), "KeypadSubtract");
    map.insert(KeyCode(110), "KeypadDecimal");
    map.insert(KeyCode(111), "KeypadDivide");

    // Function row
    map.insert(KeyCode(112), "F1");
    map.insert(KeyCode(113), "F2");
    map.insert(KeyCode(114), "F3");
    map.insert(KeyCode(115), "F4");
    map.insert(KeyCode(116), "F5");
    map.insert(KeyCode(117), "F6");
    map.insert(KeyCode(118), "F7");
    map.insert(KeyCode(119), "F8");
    map.insert(KeyCode(120), "F9");
    map.insert(KeyCode(121), "F10");
    map.insert(KeyCode(122), "F11");
    map.insert(KeyCode(123), "F12");

    // Punctuation
    map.insert(KeyCode(186), "Semicolon");
    map.insert(KeyCode(187), "Equals");
    map.insert(KeyCode(188), "Comma");
    map.insert(KeyCode(189), "Minus");
    map.insert(KeyCode(190), "Period");
    map.insert(KeyCode(191), "Slash");
    map.insert(KeyCode(192), "Grave");
    map.insert(KeyCode(219), "LeftBracket");
    map.insert(KeyCode(220), "Backslash");
    map.insert(KeyCode(221), "RightBracket");
    map.insert(KeyCode(222), "Apostrophe");

    map
});

const DIGIT_NAMES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
const KEYPAD_DIGIT_NAMES: [&str; 10] = [
    "Keypad0", "Keypad1", "Keypad2", "Keypad3", "Keypad4", "Keypad5", "Keypad6", "Keypad7",
    "Keypad8", "Keypad9",
];
const LETTER_NAMES: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];

/// Get the name of a key code, "Unknown" if it has none
pub fn key_name(code: KeyCode) -> &'static str {
    match code.0 {
        48..=57 => DIGIT_NAMES[(code.0 - 48) as usize],
        65..=90 => LETTER_NAMES[(code.0 - 65) as usize],
        96..=105 => KEYPAD_DIGIT_NAMES[(code.0 - 96) as usize],
        _ => KEY_NAMES.get(&code).copied().unwrap_or("Unknown"),
    }
}
