//! Running statistics over a scanning session

use crate::detect::{ScanErrorReason, ScanEvent};
use std::time::Duration;

/// One labelled line of the session summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub label: String,
    pub value: String,
}

impl StatLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Counters fed from [`ScanEvent`]s
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    scans: u64,
    /// Sum of scan quantities
    items: u64,
    too_short: u64,
    too_slow: u64,
    characters: u64,
    long_presses: u64,
    fastest: Option<Duration>,
    slowest: Option<Duration>,
    /// Sum of per-character times over timed scans
    char_time_total: Duration,
    timed_scans: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::Scanned(scan) => {
                self.scans += 1;
                self.items += u64::from(scan.quantity);
                // Pastes carry no timing
                if !scan.duration.is_zero() {
                    let d = scan.duration;
                    self.fastest = Some(self.fastest.map_or(d, |f| f.min(d)));
                    self.slowest = Some(self.slowest.map_or(d, |s| s.max(d)));
                    let chars = scan.text.chars().count().max(1) as u32;
                    self.char_time_total += scan.duration / chars;
                    self.timed_scans += 1;
                }
            }
            ScanEvent::Rejected { reason, .. } => match reason {
                ScanErrorReason::TooShort => self.too_short += 1,
                ScanErrorReason::TooSlow => self.too_slow += 1,
            },
            ScanEvent::Character { .. } => self.characters += 1,
            ScanEvent::LongPress => self.long_presses += 1,
        }
    }

    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn items(&self) -> u64 {
        self.items
    }

    pub fn rejections(&self) -> u64 {
        self.too_short + self.too_slow
    }

    pub fn rejections_for(&self, reason: ScanErrorReason) -> u64 {
        match reason {
            ScanErrorReason::TooShort => self.too_short,
            ScanErrorReason::TooSlow => self.too_slow,
        }
    }

    pub fn characters(&self) -> u64 {
        self.characters
    }

    pub fn long_presses(&self) -> u64 {
        self.long_presses
    }

    pub fn fastest(&self) -> Option<Duration> {
        self.fastest
    }

    pub fn slowest(&self) -> Option<Duration> {
        self.slowest
    }

    /// Mean time per character across timed scans
    pub fn avg_char_time(&self) -> Option<Duration> {
        if self.timed_scans == 0 {
            return None;
        }
        let nanos = self.char_time_total.as_nanos() / u128::from(self.timed_scans);
        Some(Duration::from_nanos(nanos as u64))
    }

    /// Share of finalized candidates that were accepted, in percent
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.scans + self.rejections();
        if total == 0 {
            return None;
        }
        Some(self.scans as f64 * 100.0 / total as f64)
    }

    pub fn summary_lines(&self) -> Vec<StatLine> {
        let mut lines = vec![
            StatLine::new("Scans", self.scans.to_string()),
            StatLine::new("Items", self.items.to_string()),
            StatLine::new(
                "Rejected",
                format!(
                    "{} ({} too short, {} too slow)",
                    self.rejections(),
                    self.too_short,
                    self.too_slow
                ),
            ),
            StatLine::new("Characters", self.characters.to_string()),
        ];

        if let Some(rate) = self.success_rate() {
            lines.push(StatLine::new("Success rate", format!("{:.1}%", rate)));
        }
        if let (Some(fastest), Some(slowest)) = (self.fastest, self.slowest) {
            lines.push(StatLine::new(
                "Scan time",
                format!("{:?} fastest, {:?} slowest", fastest, slowest),
            ));
        }
        if let Some(avg) = self.avg_char_time() {
            lines.push(StatLine::new("Avg per char", format!("{:?}", avg)));
        }
        if self.long_presses > 0 {
            lines.push(StatLine::new("Long presses", self.long_presses.to_string()));
        }
        lines
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
