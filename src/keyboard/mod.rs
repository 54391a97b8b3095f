//! Keyboard event types, key codes and event sources

mod decoder;
mod event;
pub mod keymap;
mod terminal_listener;
pub mod virtual_send;

pub use decoder::KeyDecoder;
pub use event::{InputEvent, KeyEvent, KeyEventType, KeyboardListener, PasteEvent};
pub use keymap::{key_name, KeyCode};
pub use terminal_listener::{PollStatus, TerminalListener};
pub use virtual_send::VirtualScanner;
