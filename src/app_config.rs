use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::converter::HeaderDefaults;
use crate::file_utils::FileManager;
use crate::parser::ParserLimits;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Frame rate used to read frame-based formats
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// Option key of the format written by default
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Parser bounds
    #[serde(default)]
    pub parser: ParserConfig,

    /// Values for formats that carry a header
    #[serde(default)]
    pub header: HeaderDefaults,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How far the parser reads before giving up on a format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ParserConfig {
    // @field: Lines searched for a header
    #[serde(default = "default_max_header_lines")]
    pub max_header_lines: usize,

    // @field: Lines searched for the first subtitle of a header-less format
    #[serde(default = "default_max_lookahead_lines")]
    pub max_lookahead_lines: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_header_lines: default_max_header_lines(),
            max_lookahead_lines: default_max_lookahead_lines(),
        }
    }
}

impl From<ParserConfig> for ParserLimits {
    fn from(config: ParserConfig) -> Self {
        ParserLimits {
            max_header_lines: config.max_header_lines,
            max_lookahead_lines: config.max_lookahead_lines,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_fps() -> f64 {
    23.976
}

fn default_output_format() -> String {
    "srt".to_string()
}

fn default_max_header_lines() -> usize {
    50
}

fn default_max_lookahead_lines() -> usize {
    35
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(anyhow!("Frame rate must be a positive number, got {}", self.fps));
        }

        if self.output_format.trim().is_empty() {
            return Err(anyhow!("Output format must not be empty"));
        }

        if self.parser.max_header_lines == 0 || self.parser.max_lookahead_lines == 0 {
            return Err(anyhow!("Parser line limits must be greater than zero"));
        }

        Ok(())
    }

    /// Load the configuration from `path`, writing a default one first if the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !FileManager::file_exists(path) {
            warn!("Config file not found at {}, creating a default one", path.display());
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = FileManager::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        FileManager::write_to_file(path, &content)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            fps: default_fps(),
            output_format: default_output_format(),
            parser: ParserConfig::default(),
            header: HeaderDefaults::default(),
            log_level: LogLevel::default(),
        }
    }
}
