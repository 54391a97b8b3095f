//! Key press to character decoding

use super::{KeyCode, KeyEvent};

/// Maps a key press to the character it contributes to a scan.
///
/// Only digits, letters and the numeric keypad produce characters. Modifier,
/// navigation, function and punctuation keys decode to `None`; they still
/// count for terminator and prefix matching, which works on codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDecoder;

impl KeyDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, event: &KeyEvent) -> Option<char> {
        let code = event.code;

        if code.is_keypad_digit() {
            return char::from_digit(u32::from(code.0 - 96), 10);
        }

        if code.is_alphanumeric() || code.is_keypad_operator() {
            if let Some(c) = single_char(event.key.as_deref()) {
                return Some(c);
            }
            return Some(derive_char(code, event.shift));
        }

        None
    }
}

/// The literal, when it is exactly one character.
///
/// Multi-character literals are key names ("Shift", "Enter") rather than
/// produced text.
fn single_char(literal: Option<&str>) -> Option<char> {
    let mut chars = literal?.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// The code point itself, cased by the shift flag.
///
/// Keypad operators without a literal therefore come out as letters
/// (106 is `j`).
fn derive_char(code: KeyCode, shift: bool) -> char {
    // Both ranges are below 128
    let c = char::from(code.0 as u8);
    if shift {
        c.to_ascii_uppercase()
    } else {
        c.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn key(code: u16) -> KeyEvent {
        KeyEvent::press(KeyCode(code), Instant::now())
    }

    #[test]
    fn literal_character_wins() {
        let decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(&key(65).with_key("A")), Some('A'));
        // Layout differences show up in the literal, not the code
        assert_eq!(decoder.decode(&key(81).with_key("a")), Some('a'));
    }

    #[test]
    fn letters_follow_shift_without_literal() {
        let decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(&key(65)), Some('a'));
        assert_eq!(decoder.decode(&key(65).with_shift(true)), Some('A'));
        assert_eq!(decoder.decode(&key(55).with_shift(true)), Some('7'));
    }

    #[test]
    fn empty_or_named_literal_falls_back_to_code() {
        let decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(&key(66).with_key("")), Some('b'));
        assert_eq!(decoder.decode(&key(66).with_key("Unidentified")), Some('b'));
    }

    #[test]
    fn keypad_digits_ignore_modifiers_and_literal() {
        let decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(&key(96)), Some('0'));
        assert_eq!(decoder.decode(&key(105).with_shift(true)), Some('9'));
        assert_eq!(decoder.decode(&key(100).with_key("ArrowLeft")), Some('4'));
    }

    #[test]
    fn keypad_operators_without_literal_use_code_point() {
        let decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(&key(106)), Some('j'));
        assert_eq!(decoder.decode(&key(109).with_shift(true)), Some('M'));
        assert_eq!(decoder.decode(&key(111)), Some('o'));
    }

    #[test]
    fn keypad_operators_prefer_literal() {
        let decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(&key(107).with_key("+")), Some('+'));
        assert_eq!(decoder.decode(&key(109).with_key("-").with_shift(true)), Some('-'));
    }

    #[test]
    fn other_keys_produce_nothing() {
        let decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(&key(13)), None);
        assert_eq!(decoder.decode(&key(16).with_key("Shift")), None);
        assert_eq!(decoder.decode(&key(189).with_key("-")), None);
        assert_eq!(decoder.decode(&key(112)), None);
    }
}
