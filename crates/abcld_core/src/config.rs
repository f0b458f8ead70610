//! Editor configuration.
//!
//! # Responsibility
//! - Hold tunables for persistence, default board shape and export.
//! - Reject configurations the editor cannot run with.

use crate::model::board::{DEFAULT_BOARD_TITLE, DEFAULT_WEEK_COUNT};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Storage key the board snapshot is saved under.
pub const DEFAULT_STORAGE_KEY: &str = "abcld_board";
/// Interval between periodic flushes.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);
/// Canvas color behind exported boards.
pub const DEFAULT_EXPORT_BACKGROUND: &str = "#16162a";
/// Device pixel multiplier used for raster export.
pub const DEFAULT_EXPORT_SCALE: u32 = 2;
/// Fixed pixel density for pixel to millimetre conversion.
pub const EXPORT_DPI: f64 = 96.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStorageKey,
    ZeroAutosaveInterval,
    ZeroExportScale,
    InvalidBackground(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStorageKey => write!(f, "storage key must not be blank"),
            Self::ZeroAutosaveInterval => write!(f, "autosave interval must be positive"),
            Self::ZeroExportScale => write!(f, "export scale must be positive"),
            Self::InvalidBackground(value) => {
                write!(f, "export background must be a #rrggbb color, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Runtime configuration for one editor session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub storage_key: String,
    pub autosave_interval: Duration,
    pub default_week_count: usize,
    pub default_board_title: String,
    pub export_background: String,
    pub export_scale: u32,
    pub export_dpi: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            default_week_count: DEFAULT_WEEK_COUNT,
            default_board_title: DEFAULT_BOARD_TITLE.to_string(),
            export_background: DEFAULT_EXPORT_BACKGROUND.to_string(),
            export_scale: DEFAULT_EXPORT_SCALE,
            export_dpi: EXPORT_DPI,
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if self.autosave_interval.is_zero() {
            return Err(ConfigError::ZeroAutosaveInterval);
        }
        if self.export_scale == 0 {
            return Err(ConfigError::ZeroExportScale);
        }
        if !is_hex_color(&self.export_background) {
            return Err(ConfigError::InvalidBackground(
                self.export_background.clone(),
            ));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|ch| ch.is_ascii_hexdigit())
}
