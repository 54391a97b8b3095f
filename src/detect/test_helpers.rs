//! Shared test utilities for the detection modules
//!
//! Provides event constructors, a recording listener, and a typing simulator
//! driven by synthetic timestamps.

use super::{
    KeyVerdict, Scan, ScanDetector, ScanErrorDetails, ScanErrorReason, ScanEvent, ScanListener,
};
use crate::keyboard::{keymap, KeyCode, KeyEvent, PasteEvent};
use std::time::{Duration, Instant};

/// Creates a key press event without a literal character.
pub fn press(code: KeyCode, timestamp: Instant) -> KeyEvent {
    KeyEvent::press(code, timestamp)
}

/// Creates a key release event.
pub fn release(code: KeyCode, timestamp: Instant) -> KeyEvent {
    KeyEvent::release(code, timestamp)
}

/// Creates a key press for a printable character, as a browser would report it.
pub fn char_press(c: char, timestamp: Instant) -> KeyEvent {
    let code = keymap::code_for_char(c).unwrap_or(KeyCode(0));
    KeyEvent::press(code, timestamp)
        .with_key(c.to_string())
        .with_shift(c.is_ascii_uppercase())
}

pub fn paste(text: &str, timestamp: Instant) -> PasteEvent {
    PasteEvent::new(text, timestamp)
}

/// Presses each character of `text`, `gap_ms` apart, starting at `start`.
///
/// Returns the instant one gap after the last character, a natural time for
/// whatever comes next.
pub fn type_text<L: ScanListener>(
    detector: &mut ScanDetector<L>,
    text: &str,
    start: Instant,
    gap_ms: u64,
) -> Instant {
    let gap = Duration::from_millis(gap_ms);
    let mut at = start;
    for c in text.chars() {
        detector.handle_key_down(&char_press(c, at));
        at += gap;
    }
    at
}

/// Listener that keeps every notification
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub events: Vec<ScanEvent>,
    pub raw_keys: Vec<KeyCode>,
    /// Codes the raw-key hook rejects
    pub veto: Vec<KeyCode>,
}

impl RecordingListener {
    pub fn scans(&self) -> Vec<(String, u32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Scanned(scan) => Some((scan.text.clone(), scan.quantity)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<ScanErrorReason> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Rejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn characters(&self) -> Vec<char> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Character { character, .. } => Some(*character),
                _ => None,
            })
            .collect()
    }

    pub fn long_presses(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ScanEvent::LongPress))
            .count()
    }
}

impl ScanListener for RecordingListener {
    fn on_scan_success(&mut self, scan: &Scan) {
        self.events.push(ScanEvent::Scanned(scan.clone()));
    }

    fn on_scan_error(&mut self, reason: ScanErrorReason, details: &ScanErrorDetails) {
        self.events.push(ScanEvent::Rejected {
            reason,
            details: details.clone(),
        });
    }

    fn on_character_processed(&mut self, character: char, event: &KeyEvent) {
        self.events.push(ScanEvent::Character {
            character,
            code: event.code,
        });
    }

    fn on_raw_key(&mut self, code: KeyCode, _event: &KeyEvent) -> KeyVerdict {
        self.raw_keys.push(code);
        if self.veto.contains(&code) {
            KeyVerdict::Stop
        } else {
            KeyVerdict::Continue
        }
    }

    fn on_long_press(&mut self) {
        self.events.push(ScanEvent::LongPress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_press_sets_code_literal_and_shift() {
        let event = char_press('Q', Instant::now());
        assert_eq!(event.code, KeyCode(81));
        assert_eq!(event.key.as_deref(), Some("Q"));
        assert!(event.shift);

        let event = char_press('7', Instant::now());
        assert_eq!(event.code, KeyCode(55));
        assert!(!event.shift);
    }

    #[test]
    fn type_text_returns_next_slot() {
        let t0 = Instant::now();
        let mut detector = ScanDetector::new(Default::default(), RecordingListener::default());
        let end = type_text(&mut detector, "ABC", t0, 10);
        assert_eq!(end, t0 + Duration::from_millis(30));
        assert_eq!(detector.listener().characters(), vec!['A', 'B', 'C']);
    }
}
