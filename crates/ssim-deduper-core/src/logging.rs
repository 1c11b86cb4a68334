use log::{error, info, warn, LevelFilter};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

// For file-based logging with rotation
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::DuplicateDecision;

/// Base name of the active log file and its archives
pub const LOG_FILE_STEM: &str = "dedupe";

/// Number of archive slots kept by the roller; age-based sweeping removes older ones first
const ARCHIVE_WINDOW: u32 = 50;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} - {l} - {m}{n}";

/// Path of the active log file inside `log_dir`
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{}.log", LOG_FILE_STEM))
}

/// Initialize the logger with timestamp and level.
///
/// Entries go to `<log_dir>/dedupe.log`. Once the file grows past
/// `max_log_size` it is rolled into a gzip archive `dedupe.<n>.log.gz`.
/// When `console` is set the same entries are mirrored to stderr.
pub fn init_logger(config: &Config, console: bool) -> Result<()> {
    let log_dir = config
        .log_dir
        .as_ref()
        .ok_or_else(|| Error::Logging("No log directory configured".to_string()))?;

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(log_dir)?;

    let log_file = log_file_path(log_dir);
    let archived_logs_pattern = log_dir.join(format!("{}.{{}}.log.gz", LOG_FILE_STEM));

    let file_trigger = SizeTrigger::new(config.max_log_size);

    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern.to_string_lossy(), ARCHIVE_WINDOW)
        .map_err(|e| Error::Logging(format!("Failed to create log roller: {}", e)))?;

    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&log_file, Box::new(compound_policy))
        .map_err(|e| Error::Logging(format!("Failed to create log appender: {}", e)))?;

    let mut builder =
        LogConfig::builder().appender(Appender::builder().build("file", Box::new(rolling_file)));
    let mut root = Root::builder().appender("file");

    if console {
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("console", Box::new(stderr)));
        root = root.appender("console");
    }

    let log_config = builder
        .build(root.build(LevelFilter::from(config.log_level)))
        .map_err(|e| Error::Logging(format!("Failed to build log config: {}", e)))?;

    log4rs::init_config(log_config)
        .map_err(|e| Error::Logging(format!("Failed to initialize log4rs: {}", e)))?;

    info!("Logging to file: {}", log_file.display());
    Ok(())
}

/// Whether `name` is a compressed archive produced by the roller
fn is_log_archive(name: &str) -> bool {
    name.starts_with(&format!("{}.", LOG_FILE_STEM)) && name.ends_with(".gz")
}

/// Delete compressed log archives in `log_dir` last modified before `now - retention`.
///
/// Returns the removed paths. Archives that cannot be inspected or removed are
/// logged and left in place.
pub fn sweep_expired_archives(
    log_dir: &Path,
    retention: Duration,
    now: SystemTime,
) -> Result<Vec<PathBuf>> {
    if !log_dir.is_dir() {
        return Err(Error::FileNotFound(log_dir.to_path_buf()));
    }

    let cutoff = now.checked_sub(retention).unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = Vec::new();

    for entry in WalkDir::new(log_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_log_archive(&e.file_name().to_string_lossy()))
    {
        let path = entry.path();
        let modified = match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(modified)) => modified,
            Ok(Err(e)) => {
                log_file_error(path, "metadata", &e);
                continue;
            }
            Err(e) => {
                warn!("Cannot read metadata of {}: {}", path.display(), e);
                continue;
            }
        };

        if modified >= cutoff {
            continue;
        }

        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Removed old log file {}", path.display());
                removed.push(path.to_path_buf());
            }
            Err(e) => log_file_error(path, "remove_log_archive", &e),
        }
    }

    Ok(removed)
}

/// Log file operation that failed
pub fn log_file_error(path: &Path, operation: &str, error: &dyn std::error::Error) {
    error!(
        "File operation failed - Operation: {}, Path: {}, Error: {}",
        operation,
        path.display(),
        error
    );
}

/// Log an image that could not be loaded
pub fn log_load_error(path: &Path, error: &dyn std::error::Error) {
    error!("Error loading image {}: {}", path.display(), error);
}

/// Log a duplicate decision; the remover logs the removal itself
pub fn log_duplicate(decision: &DuplicateDecision) {
    info!(
        "Duplicate {} (resolution: {}) of {} (resolution: {}), similarity {:.4}",
        decision.remove.display(),
        decision.remove_resolution,
        decision.keep.display(),
        decision.keep_resolution,
        decision.similarity
    );
}

/// Log a removal that failed
pub fn log_delete_error(path: &Path, error: &dyn std::error::Error) {
    error!("Error deleting file {}: {}", path.display(), error);
}

/// Log file system modification
pub fn log_fs_modification(operation: &str, path: &Path, details: Option<&str>) {
    let details_str = details.unwrap_or("");
    info!(
        "FS CHANGE - Operation: {}, Path: {}{}",
        operation,
        path.display(),
        if details_str.is_empty() {
            "".to_string()
        } else {
            format!(", Details: {}", details_str)
        }
    );
}
