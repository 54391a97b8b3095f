//! Notifications from the detector to its owner

use super::validator::{Scan, ScanErrorDetails, ScanErrorReason};
use crate::keyboard::{KeyCode, KeyEvent};
use std::sync::mpsc;

/// Answer from the raw-key hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyVerdict {
    /// Let the detector classify the key
    #[default]
    Continue,
    /// Skip the key entirely
    Stop,
}

/// Receives everything the detector reports.
///
/// Every method has a no-op default, so implementors only override what they
/// care about. Calls happen synchronously inside the event handler.
pub trait ScanListener {
    /// A candidate passed validation
    fn on_scan_success(&mut self, _scan: &Scan) {}

    /// A candidate was rejected
    fn on_scan_error(&mut self, _reason: ScanErrorReason, _details: &ScanErrorDetails) {}

    /// A character was appended to the current session
    fn on_character_processed(&mut self, _character: char, _event: &KeyEvent) {}

    /// Seen for every key press before classification
    fn on_raw_key(&mut self, _code: KeyCode, _event: &KeyEvent) -> KeyVerdict {
        KeyVerdict::Continue
    }

    /// The scan trigger key was held past the long press threshold
    fn on_long_press(&mut self) {}
}

impl ScanListener for () {}

impl<L: ScanListener + ?Sized> ScanListener for Box<L> {
    fn on_scan_success(&mut self, scan: &Scan) {
        (**self).on_scan_success(scan)
    }

    fn on_scan_error(&mut self, reason: ScanErrorReason, details: &ScanErrorDetails) {
        (**self).on_scan_error(reason, details)
    }

    fn on_character_processed(&mut self, character: char, event: &KeyEvent) {
        (**self).on_character_processed(character, event)
    }

    fn on_raw_key(&mut self, code: KeyCode, event: &KeyEvent) -> KeyVerdict {
        (**self).on_raw_key(code, event)
    }

    fn on_long_press(&mut self) {
        (**self).on_long_press()
    }
}

/// Owned copy of a notification, for queue-based consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Scanned(Scan),
    Rejected {
        reason: ScanErrorReason,
        details: ScanErrorDetails,
    },
    Character {
        character: char,
        code: KeyCode,
    },
    LongPress,
}

/// Forwards notifications over a channel. A dropped receiver is ignored.
///
/// The raw-key hook needs an answer synchronously, so it is not forwarded
/// and never vetoes.
impl ScanListener for mpsc::Sender<ScanEvent> {
    fn on_scan_success(&mut self, scan: &Scan) {
        let _ = self.send(ScanEvent::Scanned(scan.clone()));
    }

    fn on_scan_error(&mut self, reason: ScanErrorReason, details: &ScanErrorDetails) {
        let _ = self.send(ScanEvent::Rejected {
            reason,
            details: details.clone(),
        });
    }

    fn on_character_processed(&mut self, character: char, event: &KeyEvent) {
        let _ = self.send(ScanEvent::Character {
            character,
            code: event.code,
        });
    }

    fn on_long_press(&mut self) {
        let _ = self.send(ScanEvent::LongPress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn sender_forwards_scan_and_long_press() {
        let (mut tx, rx) = mpsc::channel();
        let scan = Scan {
            text: "ABCDEF".to_string(),
            quantity: 1,
            duration: Duration::from_millis(40),
        };

        tx.on_scan_success(&scan);
        tx.on_long_press();

        assert_eq!(rx.try_recv().ok(), Some(ScanEvent::Scanned(scan)));
        assert_eq!(rx.try_recv().ok(), Some(ScanEvent::LongPress));
    }

    #[test]
    fn sender_never_vetoes_raw_keys() {
        let (mut tx, rx) = mpsc::channel();
        let event = KeyEvent::press(KeyCode(65), Instant::now());
        assert_eq!(tx.on_raw_key(event.code, &event), KeyVerdict::Continue);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sender_survives_dropped_receiver() {
        let (mut tx, rx) = mpsc::channel::<ScanEvent>();
        drop(rx);
        tx.on_long_press();
    }
}
