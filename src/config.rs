//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub columns: ColumnsConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub sleep: SleepConfig,

    #[serde(default)]
    pub notes: NotesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Column names of the input log
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_date_column")]
    pub date: String,

    #[serde(default = "default_kind_column")]
    pub kind: String,

    #[serde(default = "default_mood_column")]
    pub mood: String,

    #[serde(default = "default_substance_column")]
    pub substance: String,

    #[serde(default = "default_activity_column")]
    pub activity: String,
}

fn default_date_column() -> String {
    "Date".to_string()
}

fn default_kind_column() -> String {
    "Type".to_string()
}

fn default_mood_column() -> String {
    "Mood".to_string()
}

fn default_substance_column() -> String {
    "Substance".to_string()
}

fn default_activity_column() -> String {
    "Activity".to_string()
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            date: default_date_column(),
            kind: default_kind_column(),
            mood: default_mood_column(),
            substance: default_substance_column(),
            activity: default_activity_column(),
        }
    }
}

/// CSV parsing options
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Extra strftime formats, tried before the built-in ones
    #[serde(default)]
    pub timestamp_formats: Vec<String>,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl IngestConfig {
    /// The delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::Invalid(format!(
                "ingest.delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            timestamp_formats: Vec::new(),
            delimiter: default_delimiter(),
        }
    }
}

/// Activity names that bracket a sleep session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SleepConfig {
    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    #[serde(default = "default_wake_marker")]
    pub wake_marker: String,
}

fn default_start_marker() -> String {
    "Sleep Start".to_string()
}

fn default_wake_marker() -> String {
    "Wake Up".to_string()
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            wake_marker: default_wake_marker(),
        }
    }
}

/// Clinician note store and export settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_notes_file")]
    pub file: String,

    #[serde(default = "default_pdf_title")]
    pub pdf_title: String,

    #[serde(default = "default_lines_per_page")]
    pub lines_per_page: usize,
}

fn default_notes_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("affectrum").join("notes.csv").to_string_lossy().to_string())
        .unwrap_or_else(|| "./affectrum_notes.csv".to_string())
}

fn default_pdf_title() -> String {
    "Affectrum CRM Notes".to_string()
}

fn default_lines_per_page() -> usize {
    50
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            file: default_notes_file(),
            pdf_title: default_pdf_title(),
            lines_per_page: default_lines_per_page(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ingest.delimiter_byte()?;
        Ok(())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("affectrum").join("config.toml")),
            Some(PathBuf::from("./affectrum.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(file) = std::env::var("AFFECTRUM_NOTES_FILE") {
            self.notes.file = file;
        }

        if let Ok(level) = std::env::var("AFFECTRUM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("AFFECTRUM_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Affectrum Configuration
#
# Environment variables override these settings:
# - AFFECTRUM_NOTES_FILE
# - AFFECTRUM_LOG_LEVEL
# - AFFECTRUM_LOG_FORMAT

[columns]
# Header names in the uploaded log
date = "Date"
kind = "Type"
mood = "Mood"
substance = "Substance"
activity = "Activity"

[ingest]
# Extra strftime formats tried before the built-in ones
timestamp_formats = []

# Field delimiter
delimiter = ","

[sleep]
# Activity names that open and close a sleep session
start_marker = "Sleep Start"
wake_marker = "Wake Up"

[notes]
# CSV file holding clinician notes
# file = "~/.local/share/affectrum/notes.csv"

# Title printed on the first page of the PDF export
pdf_title = "Affectrum CRM Notes"

# Text lines per PDF page
lines_per_page = 50

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
