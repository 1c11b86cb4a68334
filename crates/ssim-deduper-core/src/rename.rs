use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};
use crate::types::RenameReport;

/// Timestamp part of a normalized file name
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Renames files to `<prefix><timestamp>.<extension>`
pub struct Renamer {
    prefix: String,
    retry_delay: Duration,
    dry_run: bool,
    clock: Clock,
}

impl Renamer {
    /// Create a renamer using the local wall clock
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            retry_delay: Duration::from_millis(100),
            dry_run: false,
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    /// Configure how long to wait before re-reading the clock on a name collision
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Only log renames without touching the files
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replace the clock used to generate timestamps
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Whether the file name of `path` already follows the naming convention
    pub fn follows_convention(&self, path: &Path) -> bool {
        let (Some(stem), Some(_)) = (path.file_stem(), path.extension()) else {
            return false;
        };
        stem.to_str()
            .and_then(|stem| stem.strip_prefix(self.prefix.as_str()))
            .map(|timestamp| NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok())
            .unwrap_or(false)
    }

    /// Generate a free name in `directory` for a file with `extension`.
    ///
    /// Names in `claimed` count as taken. On a collision the renamer sleeps for
    /// the retry delay and tries again with a fresh timestamp.
    fn unique_target(
        &self,
        directory: &Path,
        extension: &str,
        claimed: &HashSet<PathBuf>,
    ) -> PathBuf {
        loop {
            let timestamp = (self.clock)().format(TIMESTAMP_FORMAT);
            let target = directory.join(format!("{}{}.{}", self.prefix, timestamp, extension));
            if !target.exists() && !claimed.contains(&target) {
                return target;
            }
            std::thread::sleep(self.retry_delay);
        }
    }

    /// Rename one file, keeping its directory and original extension
    fn rename_one(&self, path: &Path, claimed: &mut HashSet<PathBuf>) -> Result<PathBuf> {
        let directory = path.parent().unwrap_or_else(|| Path::new(""));
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        let target = self.unique_target(directory, &extension, claimed);

        if !self.dry_run {
            std::fs::rename(path, &target).map_err(|source| Error::Rename {
                path: path.to_path_buf(),
                source,
            })?;
        }
        claimed.insert(target.clone());
        Ok(target)
    }

    fn rename_paths<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a PathBuf>,
        report: &mut RenameReport,
        context: &str,
    ) {
        let mut claimed = HashSet::new();

        for path in paths {
            match self.rename_one(path, &mut claimed) {
                Ok(target) => {
                    let details = format!("to {}{}", target.display(), context);
                    if self.dry_run {
                        info!("DRY RUN - would rename {} {}", path.display(), details);
                    } else {
                        log_fs_modification("rename", path, Some(&details));
                    }
                    report.renamed.push((path.clone(), target));
                }
                Err(e) => {
                    log_file_error(path, "rename", &e);
                    report.failed.push(path.clone());
                }
            }
        }
    }

    /// Rename every path that does not already follow the convention
    pub fn rename_all(&self, paths: &[PathBuf]) -> RenameReport {
        let mut report = RenameReport::default();

        let (conforming, pending): (Vec<&PathBuf>, Vec<&PathBuf>) =
            paths.iter().partition(|p| self.follows_convention(p));
        report.unchanged = conforming.len();

        self.rename_paths(pending, &mut report, "");
        report
    }

    /// Warn about each path that breaks the convention and rename it
    pub fn sanity_check(&self, paths: &[PathBuf]) -> RenameReport {
        let mut report = RenameReport::default();
        let mut offenders = Vec::new();

        for path in paths {
            if self.follows_convention(path) {
                report.unchanged += 1;
            } else {
                warn!("File {} does not follow naming convention", path.display());
                offenders.push(path);
            }
        }

        self.rename_paths(offenders, &mut report, " during sanity check");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    /// A clock that advances one second per reading
    fn ticking_clock() -> impl Fn() -> NaiveDateTime + Send + Sync + 'static {
        let ticks = Arc::new(AtomicI64::new(0));
        move || base_time() + chrono::Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst))
    }

    fn renamer() -> Renamer {
        Renamer::new("image-")
            .with_retry_delay(Duration::ZERO)
            .with_clock(ticking_clock())
    }

    #[test]
    fn test_follows_convention() {
        let renamer = renamer();
        assert!(renamer.follows_convention(Path::new("/a/image-20240309-140507.jpg")));
        assert!(renamer.follows_convention(Path::new("image-20240309-140507.PNG")));
        assert!(!renamer.follows_convention(Path::new("image-20240309.jpg")));
        assert!(!renamer.follows_convention(Path::new("photo-20240309-140507.jpg")));
        assert!(!renamer.follows_convention(Path::new("image-20240309-140507")));
        assert!(!renamer.follows_convention(Path::new("IMG_0001.jpg")));
    }

    #[test]
    fn test_rename_all_keeps_extension_and_directory() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let a = dir.path().join("holiday.JPG");
        let b = sub.join("scan.png");
        File::create(&a).unwrap();
        File::create(&b).unwrap();

        let report = renamer().rename_all(&[a.clone(), b.clone()]);

        assert_eq!(report.renamed.len(), 2);
        assert!(report.failed.is_empty());
        let first = dir.path().join("image-20240309-140507.JPG");
        let second = sub.join("image-20240309-140508.png");
        assert_eq!(report.renamed[0], (a.clone(), first.clone()));
        assert_eq!(report.renamed[1], (b.clone(), second.clone()));
        assert!(first.exists() && second.exists());
        assert!(!a.exists() && !b.exists());
    }

    #[test]
    fn test_collision_waits_for_new_timestamp() {
        let dir = tempdir().unwrap();
        let taken = dir.path().join("image-20240309-140507.png");
        let source = dir.path().join("new.png");
        File::create(&taken).unwrap();
        File::create(&source).unwrap();

        let report = renamer().rename_all(&[taken.clone(), source.clone()]);

        assert_eq!(report.unchanged, 1);
        assert_eq!(
            report.renamed,
            vec![(source, dir.path().join("image-20240309-140508.png"))]
        );
        assert!(taken.exists());
    }

    #[test]
    fn test_dry_run_leaves_files_in_place() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        File::create(&a).unwrap();
        File::create(&b).unwrap();

        let dry = Renamer::new("image-")
            .with_retry_delay(Duration::ZERO)
            .with_dry_run(true)
            .with_clock(ticking_clock());
        let report = dry.rename_all(&[a.clone(), b.clone()]);

        assert_eq!(report.renamed.len(), 2);
        assert_ne!(report.renamed[0].1, report.renamed[1].1);
        assert!(a.exists() && b.exists());
    }

    #[test]
    fn test_rename_failure_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.png");

        let report = renamer().rename_all(&[missing.clone()]);

        assert!(report.renamed.is_empty());
        assert_eq!(report.failed, vec![missing]);
    }

    #[test]
    fn test_sanity_check_fixes_offenders() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("image-20240101-000000.bmp");
        let bad = dir.path().join("image-broken.bmp");
        File::create(&good).unwrap();
        File::create(&bad).unwrap();

        let report = renamer().sanity_check(&[good.clone(), bad.clone()]);

        assert_eq!(report.unchanged, 1);
        assert_eq!(report.renamed.len(), 1);
        assert_eq!(report.renamed[0].0, bad);
        assert!(renamer().follows_convention(&report.renamed[0].1));
        assert!(good.exists());
    }
}
