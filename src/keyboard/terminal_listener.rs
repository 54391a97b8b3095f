//! Terminal keyboard listener built on crossterm
//!
//! Reads key and paste events from the controlling terminal in raw mode.
//! Unlike the global listener it sees the literal characters the terminal
//! produced and whole pastes (via bracketed paste). Key releases are only
//! reported by terminals that support the keyboard enhancement protocol.

use super::{keymap, InputEvent, KeyCode, KeyEvent, KeyEventType, PasteEvent};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, ModifierKeyCode, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Outcome of a single terminal poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// Zero or more events were forwarded
    Continue(usize),
    /// The user asked to quit (Ctrl+C)
    Quit,
}

/// Raw-mode terminal listener
///
/// Restores the terminal when dropped.
pub struct TerminalListener {
    event_tx: mpsc::Sender<InputEvent>,
    enhanced: bool,
}

impl TerminalListener {
    /// Put the terminal into raw mode and start listening
    pub fn new(event_tx: mpsc::Sender<InputEvent>) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnableBracketedPaste)?;

        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                out,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                )
            )?;
        }
        log::info!("terminal listener started (key releases: {})", enhanced);

        Ok(Self { event_tx, enhanced })
    }

    /// Whether the terminal reports key releases
    pub fn reports_releases(&self) -> bool {
        self.enhanced
    }

    /// Wait up to `timeout` for terminal input and forward everything pending
    pub fn poll(&mut self, timeout: Duration) -> io::Result<PollStatus> {
        let mut forwarded = 0;
        let mut wait = timeout;

        while event::poll(wait)? {
            wait = Duration::ZERO;
            let now = Instant::now();
            let input = match event::read()? {
                Event::Key(key) if is_interrupt(&key) => return Ok(PollStatus::Quit),
                Event::Key(key) => translate_key(&key, now).map(InputEvent::Key),
                Event::Paste(text) => Some(InputEvent::Paste(PasteEvent::new(text, now))),
                _ => None,
            };

            if let Some(input) = input {
                if self.event_tx.send(input).is_ok() {
                    forwarded += 1;
                }
            }
        }

        Ok(PollStatus::Continue(forwarded))
    }
}

impl Drop for TerminalListener {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.enhanced {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(out, DisableBracketedPaste);
        let _ = terminal::disable_raw_mode();
    }
}

fn is_interrupt(key: &event::KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, event::KeyCode::Char('c') | event::KeyCode::Char('C'))
}

/// Convert a crossterm key event into a virtual-key event
pub(crate) fn translate_key(key: &event::KeyEvent, timestamp: Instant) -> Option<KeyEvent> {
    use event::KeyCode as CtKeyCode;

    let event_type = match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => KeyEventType::Press,
        KeyEventKind::Release => KeyEventType::Release,
    };
    let mut shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let (code, literal) = match key.code {
        CtKeyCode::Char(c) => {
            shift |= c.is_ascii_uppercase();
            (keymap::code_for_char(c)?, Some(c.to_string()))
        }
        CtKeyCode::Enter => (KeyCode::ENTER, None),
        CtKeyCode::Tab => (KeyCode::TAB, None),
        CtKeyCode::BackTab => {
            shift = true;
            (KeyCode::TAB, None)
        }
        CtKeyCode::Backspace => (KeyCode::BACKSPACE, None),
        CtKeyCode::Esc => (KeyCode::ESCAPE, None),
        CtKeyCode::PageUp => (KeyCode(33), None),
        CtKeyCode::PageDown => (KeyCode(34), None),
        CtKeyCode::End => (KeyCode(35), None),
        CtKeyCode::Home => (KeyCode(36), None),
        CtKeyCode::Left => (KeyCode(37), None),
        CtKeyCode::Up => (KeyCode(38), None),
        CtKeyCode::Right => (KeyCode(39), None),
        CtKeyCode::Down => (KeyCode(40), None),
        CtKeyCode::Insert => (KeyCode(45), None),
        CtKeyCode::Delete => (KeyCode(46), None),
        CtKeyCode::F(n @ 1..=24) => (KeyCode(KeyCode::F1.0 + u16::from(n) - 1), None),
        CtKeyCode::CapsLock => (KeyCode::CAPS_LOCK, None),
        CtKeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => (KeyCode::SHIFT, None),
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => {
                (KeyCode::CONTROL, None)
            }
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => (KeyCode::ALT, None),
            _ => return None,
        },
        _ => return None,
    };

    let mut event = KeyEvent::new(code, event_type, timestamp).with_shift(shift);
    event.key = literal;
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode as CtKeyCode, KeyEvent as CtKeyEvent, KeyEventState};

    fn ct(code: CtKeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CtKeyEvent {
        CtKeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn translates_characters_with_literal() {
        let now = Instant::now();
        let event = translate_key(
            &ct(CtKeyCode::Char('Q'), KeyModifiers::SHIFT, KeyEventKind::Press),
            now,
        )
        .expect("letter translates");
        assert_eq!(event.code, KeyCode(81));
        assert_eq!(event.key.as_deref(), Some("Q"));
        assert!(event.shift);
        assert_eq!(event.event_type, KeyEventType::Press);
    }

    #[test]
    fn translates_enter_and_function_keys() {
        let now = Instant::now();
        let enter = translate_key(
            &ct(CtKeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Press),
            now,
        )
        .expect("enter translates");
        assert_eq!(enter.code, KeyCode::ENTER);
        assert!(enter.key.is_none());

        let f5 = translate_key(&ct(CtKeyCode::F(5), KeyModifiers::NONE, KeyEventKind::Press), now)
            .expect("F5 translates");
        assert_eq!(f5.code, KeyCode(116));
    }

    #[test]
    fn repeat_counts_as_press_and_release_is_kept() {
        let now = Instant::now();
        let repeat = translate_key(
            &ct(CtKeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Repeat),
            now,
        )
        .expect("repeat translates");
        assert!(repeat.is_press());

        let release = translate_key(
            &ct(CtKeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release),
            now,
        )
        .expect("release translates");
        assert_eq!(release.event_type, KeyEventType::Release);
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        let now = Instant::now();
        assert!(translate_key(
            &ct(CtKeyCode::Char('é'), KeyModifiers::NONE, KeyEventKind::Press),
            now
        )
        .is_none());
        assert!(translate_key(&ct(CtKeyCode::Null, KeyModifiers::NONE, KeyEventKind::Press), now)
            .is_none());
    }

    #[test]
    fn ctrl_c_is_interrupt() {
        assert!(is_interrupt(&ct(
            CtKeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press
        )));
        assert!(!is_interrupt(&ct(
            CtKeyCode::Char('c'),
            KeyModifiers::NONE,
            KeyEventKind::Press
        )));
    }
}
