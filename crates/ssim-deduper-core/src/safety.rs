use log::info;
use std::io;
use std::path::Path;

use crate::logging::log_fs_modification;

/// Deletion primitive used by the deduplicator
pub trait FileRemover: Send + Sync {
    /// Remove the file at `path`
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Removes files from the file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)?;
        log_fs_modification("delete", path, None);
        Ok(())
    }
}

/// Leaves every file in place and only logs what would be removed
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRemover;

impl FileRemover for DryRunRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        info!("DRY RUN - would delete {}", path.display());
        Ok(())
    }
}
