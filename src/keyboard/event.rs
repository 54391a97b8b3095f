//! Keyboard event types and listener

use super::KeyCode;
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::sync::mpsc;
use std::time::Instant;

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key was pressed down
    Press,
    /// Key was released
    Release,
}

/// A keyboard event with timing information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The virtual key code
    pub code: KeyCode,
    /// Type of event (press/release)
    pub event_type: KeyEventType,
    /// Character the platform attached to the press, if any
    pub key: Option<String>,
    /// Whether shift was held when the event occurred
    pub shift: bool,
    /// When the event occurred
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn new(code: KeyCode, event_type: KeyEventType, timestamp: Instant) -> Self {
        Self {
            code,
            event_type,
            key: None,
            shift: false,
            timestamp,
        }
    }

    pub fn press(code: KeyCode, timestamp: Instant) -> Self {
        Self::new(code, KeyEventType::Press, timestamp)
    }

    pub fn release(code: KeyCode, timestamp: Instant) -> Self {
        Self::new(code, KeyEventType::Release, timestamp)
    }

    /// Attach the literal character reported by the platform
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn is_press(&self) -> bool {
        self.event_type == KeyEventType::Press
    }
}

/// Text delivered in one piece by a paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    pub text: String,
    pub timestamp: Instant,
}

impl PasteEvent {
    pub fn new(text: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }
}

/// Anything an event source can deliver to the detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Paste(PasteEvent),
}

impl InputEvent {
    pub fn timestamp(&self) -> Instant {
        match self {
            InputEvent::Key(event) => event.timestamp,
            InputEvent::Paste(event) => event.timestamp,
        }
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        InputEvent::Key(event)
    }
}

impl From<PasteEvent> for InputEvent {
    fn from(event: PasteEvent) -> Self {
        InputEvent::Paste(event)
    }
}

/// Global keyboard listener that polls for key state changes
///
/// Sees every key on the system, not only the focused terminal. The platform
/// only reports which keys are down, so events carry no literal character and
/// the shift flag is derived from the shift keys' state.
pub struct KeyboardListener {
    device_state: DeviceState,
    last_keys: Vec<Keycode>,
    event_tx: mpsc::Sender<InputEvent>,
}

impl KeyboardListener {
    /// Create a new keyboard listener
    pub fn new(event_tx: mpsc::Sender<InputEvent>) -> Self {
        Self {
            device_state: DeviceState::new(),
            last_keys: Vec::new(),
            event_tx,
        }
    }

    /// Poll for keyboard state changes
    /// Returns the number of events generated
    pub fn poll(&mut self) -> usize {
        let now = Instant::now();
        let current_keys = self.device_state.get_keys();
        let shift = current_keys
            .iter()
            .any(|k| matches!(k, Keycode::LShift | Keycode::RShift));
        let mut event_count = 0;

        // Check for new key presses
        for key in &current_keys {
            if !self.last_keys.contains(key) {
                let event = KeyEvent::press(KeyCode::from(*key), now).with_shift(shift);
                if self.event_tx.send(event.into()).is_ok() {
                    event_count += 1;
                }
            }
        }

        // Check for key releases
        for key in &self.last_keys {
            if !current_keys.contains(key) {
                let event = KeyEvent::release(KeyCode::from(*key), now).with_shift(shift);
                if self.event_tx.send(event.into()).is_ok() {
                    event_count += 1;
                }
            }
        }

        self.last_keys = current_keys;
        event_count
    }
}
