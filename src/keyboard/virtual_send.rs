//! Synthetic scanner input
//!
//! Types a barcode followed by Enter at hardware-scanner speed through the
//! platform input APIs, so the whole pipeline can be exercised without a
//! scanner attached.
//!
//! Note: requires the 'virtual-send' feature and appropriate system
//! libraries (libxdo on Linux, etc.)

use std::time::Duration;

/// Delay between synthetic keystrokes, well under the default per-char budget
pub const DEFAULT_KEY_INTERVAL: Duration = Duration::from_millis(5);

/// Virtual scanner - conditionally compiled
#[cfg(feature = "virtual-send")]
pub struct VirtualScanner {
    interval: Duration,
}

#[cfg(feature = "virtual-send")]
impl VirtualScanner {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Type `barcode` and a terminating Enter
    pub fn send_scan(&mut self, barcode: &str) -> Result<(), String> {
        use enigo::{Direction, Enigo, Key, Keyboard, Settings};
        use std::thread;

        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| format!("Failed to init: {}", e))?;

        for c in barcode.chars() {
            enigo
                .key(Key::Unicode(c), Direction::Click)
                .map_err(|e| format!("Key '{}' failed: {}", c, e))?;
            thread::sleep(self.interval);
        }

        enigo
            .key(Key::Return, Direction::Click)
            .map_err(|e| format!("Enter failed: {}", e))?;

        log::debug!("sent virtual scan of {} chars", barcode.chars().count());
        Ok(())
    }

    pub fn is_available() -> bool {
        true
    }
}

/// Stub implementation when virtual-send feature is not enabled
#[cfg(not(feature = "virtual-send"))]
pub struct VirtualScanner;

#[cfg(not(feature = "virtual-send"))]
impl VirtualScanner {
    pub fn new(_interval: Duration) -> Self {
        Self
    }

    pub fn send_scan(&mut self, _barcode: &str) -> Result<(), String> {
        Err("Virtual sending not available - build with --features virtual-send".to_string())
    }

    pub fn is_available() -> bool {
        false
    }
}

impl Default for VirtualScanner {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_INTERVAL)
    }
}

#[cfg(all(test, not(feature = "virtual-send")))]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_unavailable() {
        assert!(!VirtualScanner::is_available());
        let err = VirtualScanner::default().send_scan("0123456789").unwrap_err();
        assert!(err.contains("virtual-send"));
    }
}
