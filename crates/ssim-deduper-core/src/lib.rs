//! Core functionality for finding and removing duplicate images.
//!
//! This library provides the components of a deduplicate-and-rename run:
//! - Recursive discovery of image files by extension
//! - Grayscale loading, structural similarity and quarter-turn rotations
//! - Pairwise duplicate detection that keeps the higher-resolution image
//! - Safe file removal, timestamp renaming and log-file maintenance

// -- External Dependencies --
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

// -- Standard Library --
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use deduplication::{Deduplicator, DUPLICATE_THRESHOLD};
pub use error::{Error, Result};
pub use types::*;

// -- Public Modules --
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod logging;
pub mod processing;
pub mod rename;
pub mod safety;
pub mod types;

use processing::FsImageLoader;
use rename::Renamer;
use safety::{DryRunRemover, FsRemover};

/// Main entry point for the deduplicate-and-rename process
pub struct ImageDeduper {
    config: Config,
}

impl ImageDeduper {
    /// Create a new ImageDeduper with the provided configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List all images below `directory` matching the configured extensions
    pub fn discover_images(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        discovery::list_images(directory, &self.config.extensions, self.config.max_depth)
    }

    /// Compare the given images pairwise and remove the lower-resolution duplicates
    pub fn deduplicate(&self, paths: &[PathBuf]) -> DedupeReport {
        let progress = if self.config.show_progress {
            let bar = ProgressBar::new(paths.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            {
                bar.set_style(style.progress_chars("##-"));
            }
            bar.set_message("Comparing images...");
            bar
        } else {
            ProgressBar::hidden()
        };

        let threads = self.config.worker_threads();
        let batch_size = self.config.batch_size;

        if self.config.dry_run {
            Deduplicator::new(FsImageLoader, DryRunRemover)
                .with_threads(threads)
                .with_batch_size(batch_size)
                .with_progress(progress)
                .deduplicate(paths)
        } else {
            Deduplicator::new(FsImageLoader, FsRemover)
                .with_threads(threads)
                .with_batch_size(batch_size)
                .with_progress(progress)
                .deduplicate(paths)
        }
    }

    fn renamer(&self) -> Renamer {
        Renamer::new(self.config.filename_prefix.clone())
            .with_retry_delay(self.config.rename_retry_delay())
            .with_dry_run(self.config.dry_run)
    }

    /// Images below `directory` that were not removed by `report`.
    ///
    /// After a real run the removed files are already gone; in a dry run they
    /// are still on disk and have to be left out explicitly. Files whose
    /// removal failed are still present and count as survivors.
    fn surviving_images(&self, directory: &Path, report: &DedupeReport) -> Result<Vec<PathBuf>> {
        let removed: HashSet<PathBuf> = report.removed().into_iter().collect();
        let images = self.discover_images(directory)?;
        Ok(images.into_iter().filter(|p| !removed.contains(p)).collect())
    }

    /// Rename every image below `directory` to the timestamp scheme
    pub fn rename_images(&self, directory: &Path) -> Result<RenameReport> {
        let images = self.discover_images(directory)?;
        Ok(self.renamer().rename_all(&images))
    }

    /// Rename any image below `directory` that still breaks the naming convention
    pub fn sanity_check(&self, directory: &Path) -> Result<RenameReport> {
        let images = self.discover_images(directory)?;
        Ok(self.renamer().sanity_check(&images))
    }

    /// Remove expired log archives if file logging is configured
    pub fn sweep_logs(&self) -> Vec<PathBuf> {
        let Some(log_dir) = self.config.log_dir.as_deref() else {
            return Vec::new();
        };

        match logging::sweep_expired_archives(log_dir, self.config.log_retention(), SystemTime::now())
        {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Log archive sweep failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Run the full pipeline on `directory`
    pub fn run(&self, directory: &Path) -> Result<RunSummary> {
        info!("Starting duplicate removal in directory: {}", directory.display());
        let images = self.discover_images(directory)?;
        info!("Found {} images to process", images.len());

        let report = self.deduplicate(&images);
        info!("Duplicate removal process completed");

        let (renamed, sanity_fixed) = if self.config.rename_files {
            info!("Starting renaming process");
            let survivors = self.surviving_images(directory, &report)?;
            let renamed = self.renamer().rename_all(&survivors);
            info!("Renaming process completed");

            // A dry run leaves the old names in place, so there is nothing to re-check
            let fixed = if self.config.dry_run {
                None
            } else {
                info!("Starting sanity check process");
                let fixed = self.sanity_check(directory)?;
                info!("Sanity check process completed");
                Some(fixed)
            };

            (Some(renamed), fixed)
        } else {
            (None, None)
        };

        let archives_removed = self.sweep_logs();

        Ok(RunSummary {
            discovered: images.len(),
            report,
            renamed,
            sanity_fixed,
            archives_removed,
        })
    }
}
