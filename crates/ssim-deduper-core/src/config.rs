use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Configuration for the deduplicate-and-rename run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recognized file extensions, matched case-insensitively against the file name
    pub extensions: Vec<String>,

    /// Maximum directory depth for scanning
    pub max_depth: Option<usize>,

    /// Whether to run without making changes
    pub dry_run: bool,

    /// Number of threads used to evaluate candidates (0 = auto)
    pub threads: usize,

    /// Number of candidates loaded and scored together in one parallel chunk
    pub batch_size: usize,

    /// Whether surviving files are renamed to the timestamp scheme
    pub rename_files: bool,

    /// Prefix of normalized file names
    pub filename_prefix: String,

    /// Delay before retrying when a generated name is already taken (milliseconds)
    pub rename_retry_ms: u64,

    /// Directory for the rolling log file. `None` logs to stderr only
    pub log_dir: Option<PathBuf>,

    /// Size in bytes at which the log file is rolled and compressed
    pub max_log_size: u64,

    /// Age in days after which compressed log archives are removed
    pub log_retention_days: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Whether to draw a progress bar during the comparison pass
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec![
                ".png".to_string(),
                ".jpg".to_string(),
                ".jpeg".to_string(),
                ".bmp".to_string(),
            ],
            max_depth: None,
            dry_run: false,
            threads: 0, // Auto
            batch_size: 16,
            rename_files: true,
            filename_prefix: "image-".to_string(),
            rename_retry_ms: 100,
            log_dir: None,
            max_log_size: 1024 * 1024, // 1MB
            log_retention_days: 10,
            log_level: LogLevel::Info,
            show_progress: false,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(Error::Configuration(
                "At least one image extension must be given".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(Error::Configuration(
                "Batch size must be at least 1".to_string(),
            ));
        }

        if self.filename_prefix.is_empty()
            || self.filename_prefix.contains(std::path::is_separator)
        {
            return Err(Error::Configuration(format!(
                "Invalid file name prefix: {:?}",
                self.filename_prefix
            )));
        }

        if self.max_log_size == 0 {
            return Err(Error::Configuration(
                "Maximum log size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of worker threads, resolving 0 to the number of CPUs
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    pub fn rename_retry_delay(&self) -> Duration {
        Duration::from_millis(self.rename_retry_ms)
    }

    pub fn log_retention(&self) -> Duration {
        Duration::from_secs(self.log_retention_days.saturating_mul(24 * 60 * 60))
    }
}
