//! Validation of finished scan candidates

use crate::config::ScannerConfig;
use std::time::{Duration, Instant};

/// Why a candidate was not accepted as a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanErrorReason {
    /// Fewer characters than the configured minimum
    TooShort,
    /// Typed slower than a scanner would, most likely by hand
    TooSlow,
}

impl ScanErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooShort => "too short",
            Self::TooSlow => "entered too slowly",
        }
    }
}

impl std::fmt::Display for ScanErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to see which bound a rejected candidate failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanErrorDetails {
    pub candidate: String,
    /// Time from first to last character
    pub duration: Duration,
    pub min_length: usize,
    pub avg_time_by_char: Duration,
}

impl ScanErrorDetails {
    pub fn length(&self) -> usize {
        self.candidate.chars().count()
    }

    /// Longest duration the candidate could have taken and still pass
    pub fn max_duration(&self) -> Duration {
        time_budget(self.avg_time_by_char, self.length())
    }
}

/// An accepted scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub text: String,
    pub quantity: u32,
    /// Time from first to last character, zero for pastes
    pub duration: Duration,
}

/// Result of validating a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    Valid(Scan),
    Invalid {
        reason: ScanErrorReason,
        details: ScanErrorDetails,
    },
}

impl ScanVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Decides whether a finished candidate is a scan
#[derive(Debug, Clone)]
pub struct ScanValidator {
    min_length: usize,
    avg_time_by_char: Duration,
    quantity: u32,
}

impl ScanValidator {
    pub fn new(min_length: usize, avg_time_by_char: Duration, quantity: u32) -> Self {
        Self {
            min_length,
            avg_time_by_char,
            quantity,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(
            config.min_length,
            config.avg_time_by_char(),
            config.quantity,
        )
    }

    /// Classify a candidate. Missing timestamps count as zero duration.
    pub fn validate(
        &self,
        candidate: String,
        first_char_at: Option<Instant>,
        last_char_at: Option<Instant>,
    ) -> ScanVerdict {
        let length = candidate.chars().count();
        let duration = match (first_char_at, last_char_at) {
            (Some(first), Some(last)) => last.saturating_duration_since(first),
            _ => Duration::ZERO,
        };

        let reason = if length < self.min_length {
            Some(ScanErrorReason::TooShort)
        } else if duration > time_budget(self.avg_time_by_char, length) {
            Some(ScanErrorReason::TooSlow)
        } else {
            None
        };

        match reason {
            Some(reason) => ScanVerdict::Invalid {
                reason,
                details: ScanErrorDetails {
                    candidate,
                    duration,
                    min_length: self.min_length,
                    avg_time_by_char: self.avg_time_by_char,
                },
            },
            None => ScanVerdict::Valid(Scan {
                text: candidate,
                quantity: self.quantity,
                duration,
            }),
        }
    }
}

fn time_budget(avg_time_by_char: Duration, length: usize) -> Duration {
    avg_time_by_char.saturating_mul(u32::try_from(length).unwrap_or(u32::MAX))
}
