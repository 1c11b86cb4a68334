mod common;

use common::{rotated, test_image, write_corrupt, write_png};
use log::{Level, LevelFilter, Log, Metadata, Record};
use ssim_deduper_core::processing::FsImageLoader;
use ssim_deduper_core::safety::FsRemover;
use ssim_deduper_core::Deduplicator;
use std::sync::Mutex;
use tempfile::tempdir;

/// Keeps every formatted record in memory
struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

// The logger is process-wide, so this binary holds a single test
#[test]
fn test_one_entry_per_decision_and_failure() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Info);

    let dir = tempdir().unwrap();
    let x = write_corrupt(dir.path(), "x.png");
    let original = test_image(100, 100, 21);
    let a = write_png(dir.path(), "a.png", &original);
    let b = write_png(dir.path(), "b.png", &rotated(&original, 180));

    let report = Deduplicator::new(FsImageLoader, FsRemover).deduplicate(&[
        x.clone(),
        a.clone(),
        b.clone(),
    ]);
    assert_eq!(report.decisions.len(), 1);

    let records = LOGGER.records.lock().unwrap().clone();
    let matching = |level: Level, needle: &str| {
        records
            .iter()
            .filter(|(l, message)| *l == level && message.contains(needle))
            .cloned()
            .collect::<Vec<_>>()
    };

    let load_errors = matching(Level::Error, "Error loading image");
    assert_eq!(load_errors.len(), 1);
    assert!(load_errors[0].1.contains(&x.display().to_string()));

    let duplicates = matching(Level::Info, "Duplicate ");
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].1.contains(&b.display().to_string()));
    assert!(duplicates[0].1.contains("resolution: 10000"));

    let deletions = matching(Level::Info, "Operation: delete");
    assert_eq!(deletions.len(), 1);
    assert!(deletions[0].1.contains(&b.display().to_string()));
    assert!(a.exists() && !b.exists());
}
