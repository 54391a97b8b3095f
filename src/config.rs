//! Configuration management for scan-detect
//!
//! Configuration is read from a platform-specific config file and falls back
//! to defaults when the file does not exist.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/scan-detect/config.toml` |
//! | macOS | `~/Library/Application Support/scan-detect/config.toml` |
//! | Windows | `%APPDATA%\scan-detect\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use scan_detect::Config;
//!
//! // Load existing config or use defaults
//! let mut config = Config::load().unwrap_or_default();
//!
//! // Accept shorter barcodes
//! config.scanner.min_length = 4;
//!
//! // Save to disk
//! config.save().expect("Failed to save config");
//! ```

use crate::keyboard::KeyCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A setting has a value the detector cannot work with
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("scan-detect");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Scan detection settings
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// How the command line tool prints results
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scan detection settings
///
/// Fixed for the lifetime of a detector; build a new detector to change them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScannerConfig {
    /// Shortest candidate accepted as a scan, in characters
    pub min_length: usize,
    /// Upper bound on the average time between characters of a scan
    pub avg_time_by_char_ms: u64,
    /// Inactivity after which an unterminated scan is validated
    pub quiet_period_ms: u64,
    /// Key codes that end a scan (Enter by default)
    pub terminator_codes: Vec<u16>,
    /// Key codes swallowed before a scan starts
    pub prefix_codes: Vec<u16>,
    /// Dedicated hardware trigger key, if the scanner has one
    pub scan_button_code: Option<u16>,
    /// How long the trigger key must be held to count as a long press
    pub long_press_ms: u64,
    /// Detect scans from key presses
    pub react_to_keydown: bool,
    /// Treat pasted text as a scan
    pub react_to_paste: bool,
    /// Ask the event source to suppress the default action of scan characters
    pub prevent_default: bool,
    /// Ask the event source to stop propagating scan characters and pastes
    pub stop_propagation: bool,
    /// Quantity reported with every successful scan
    pub quantity: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            avg_time_by_char_ms: 30,
            quiet_period_ms: 100,
            terminator_codes: vec![KeyCode::ENTER.0],
            prefix_codes: Vec::new(),
            scan_button_code: None,
            long_press_ms: 500,
            react_to_keydown: true,
            react_to_paste: true,
            prevent_default: true,
            stop_propagation: false,
            quantity: 1,
        }
    }
}

impl ScannerConfig {
    pub fn avg_time_by_char(&self) -> Duration {
        Duration::from_millis(self.avg_time_by_char_ms)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn long_press_threshold(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn is_terminator(&self, code: KeyCode) -> bool {
        self.terminator_codes.contains(&code.0)
    }

    pub fn is_prefix(&self, code: KeyCode) -> bool {
        self.prefix_codes.contains(&code.0)
    }

    pub fn is_scan_button(&self, code: KeyCode) -> bool {
        self.scan_button_code == Some(code.0)
    }

    /// Check that the settings describe a usable detector
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_length == 0 {
            return Err(invalid("min_length", "must be at least 1"));
        }
        if self.avg_time_by_char_ms == 0 {
            return Err(invalid("avg_time_by_char_ms", "must be greater than 0"));
        }
        if self.quiet_period_ms == 0 {
            return Err(invalid("quiet_period_ms", "must be greater than 0"));
        }
        if self.quantity == 0 {
            return Err(invalid("quantity", "must be at least 1"));
        }
        if let Some(code) = self
            .terminator_codes
            .iter()
            .find(|code| self.prefix_codes.contains(code))
        {
            return Err(invalid(
                "prefix_codes",
                format!("key code {} is also a terminator", code),
            ));
        }
        if let Some(button) = self.scan_button_code {
            if self.terminator_codes.contains(&button) || self.prefix_codes.contains(&button) {
                return Err(invalid(
                    "scan_button_code",
                    format!("key code {} is already a terminator or prefix", button),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Output settings for the command line tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Print one JSON object per scan instead of text
    pub json: bool,
    /// Prefix text output with the local time
    pub timestamps: bool,
    /// Also print rejected candidates
    pub show_rejected: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            timestamps: true,
            show_rejected: true,
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or holds
    /// invalid settings.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.scanner.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
