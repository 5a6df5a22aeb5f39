use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::textgrid_parser::Strictness;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Regex applied to each filename; its first capture group is the annotator id
    #[serde(default = "default_annotator_pattern")]
    pub annotator_pattern: String,

    /// Annotator id used when the pattern does not match
    #[serde(default = "default_annotator_fallback")]
    pub annotator_fallback: String,

    /// Extension of input files when scanning directories
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Reaction to unrecognized lines
    #[serde(default)]
    pub strictness: Strictness,

    /// File name of the one-row-per-document table
    #[serde(default = "default_document_table")]
    pub document_table: String,

    /// File name of the one-row-per-interval table
    #[serde(default = "default_interval_table")]
    pub interval_table: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_annotator_pattern() -> String {
    r"bmp\.(\w+)\.TextGrid".to_string()
}

fn default_annotator_fallback() -> String {
    "BLANK".to_string()
}

fn default_extension() -> String {
    "TextGrid".to_string()
}

fn default_document_table() -> String {
    "sound_file_desc.tsv".to_string()
}

fn default_interval_table() -> String {
    "sound_file_intervals.tsv".to_string()
}

impl Config {
    /// Load configuration from a JSON file, creating it with defaults if missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            log::warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(path, config_json)
                .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
            Ok(config)
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let pattern = self.annotator_regex()?;
        if pattern.captures_len() < 2 {
            return Err(anyhow!(
                "Annotator pattern must contain a capture group: {}",
                self.annotator_pattern
            ));
        }

        if self.extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("Input file extension must not be empty"));
        }

        if self.document_table.is_empty() || self.interval_table.is_empty() {
            return Err(anyhow!("Output table names must not be empty"));
        }

        if self.document_table == self.interval_table {
            return Err(anyhow!(
                "Document and interval tables must have different names: {}",
                self.document_table
            ));
        }

        Ok(())
    }

    /// Compile the annotator pattern
    pub fn annotator_regex(&self) -> Result<Regex> {
        Regex::new(&self.annotator_pattern)
            .with_context(|| format!("Invalid annotator pattern: {}", self.annotator_pattern))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            annotator_pattern: default_annotator_pattern(),
            annotator_fallback: default_annotator_fallback(),
            extension: default_extension(),
            strictness: Strictness::default(),
            document_table: default_document_table(),
            interval_table: default_interval_table(),
            log_level: LogLevel::default(),
        }
    }
}
