//! scan-detect - Barcode scanner detection on a shared keyboard channel
//!
//! Keyboard-emulating barcode scanners type into the same event stream as the
//! user. This crate separates scanner bursts from human typing by length and
//! per-character speed, and reports each burst as a scan or a rejection.

pub mod config;
pub mod detect;
pub mod keyboard;
pub mod scanner;
pub mod stats;

pub use config::{Config, ScannerConfig};
pub use detect::{EventDisposition, Scan, ScanDetector, ScanErrorReason, ScanEvent, ScanListener};
pub use scanner::{EventSource, Scanner, ScannerError};
pub use stats::ScanStats;
