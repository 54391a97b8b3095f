//! Barcode scan detection
//!
//! Scanners that emulate a keyboard type the barcode much faster and more
//! regularly than a person can, usually followed by Enter. This module tells
//! the two apart and turns scanner bursts into [`Scan`]s.

mod detector;
mod listener;
mod long_press;
mod timer;
mod validator;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use detector::{EventDisposition, ScanDetector};
pub use listener::{KeyVerdict, ScanEvent, ScanListener};
pub use long_press::LongPressTracker;
pub use timer::{OneShotTimer, TimerHandle};
pub use validator::{Scan, ScanErrorDetails, ScanErrorReason, ScanValidator, ScanVerdict};
