use serde::Serialize;
use std::path::PathBuf;

/// Resolution state of one path during a deduplication pass.
///
/// Every path starts as `Unvisited` and reaches exactly one terminal state.
/// Terminal states are never left again within the same pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathState {
    /// Not yet examined as the outer-loop image
    Unvisited,

    /// Compared against every remaining candidate and survived
    Kept,

    /// Removed as the lower-resolution member of a duplicate pair
    Deleted,

    /// Could not be loaded when its turn as the outer-loop image came
    Skipped,
}

impl PathState {
    /// Whether the path must no longer be loaded or compared
    pub fn is_resolved(self) -> bool {
        !matches!(self, PathState::Unvisited)
    }
}

/// One detected duplicate pair and the member chosen for removal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateDecision {
    /// Path that survives
    pub keep: PathBuf,

    /// Pixel-area resolution of the survivor
    pub keep_resolution: u64,

    /// Path scheduled for deletion
    pub remove: PathBuf,

    /// Pixel-area resolution of the removed file
    pub remove_resolution: u64,

    /// Best structural similarity over the four orientations
    pub similarity: f64,
}

/// Outcome of one deduplication pass
#[derive(Debug, Clone, Serialize)]
pub struct DedupeReport {
    /// Input paths in the order they were examined
    pub paths: Vec<PathBuf>,

    /// Final state of each path, parallel to `paths`
    pub states: Vec<PathState>,

    /// Every duplicate decision, in the order it was applied
    pub decisions: Vec<DuplicateDecision>,

    /// Paths whose removal was attempted but failed
    pub delete_failures: Vec<PathBuf>,
}

impl DedupeReport {
    fn paths_in_state(&self, state: PathState) -> Vec<PathBuf> {
        self.paths
            .iter()
            .zip(&self.states)
            .filter(|(_, s)| **s == state)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Paths resolved as deleted (including failed removals)
    pub fn deleted(&self) -> Vec<PathBuf> {
        self.paths_in_state(PathState::Deleted)
    }

    /// Deleted paths whose removal succeeded, i.e. no longer on disk
    pub fn removed(&self) -> Vec<PathBuf> {
        self.deleted()
            .into_iter()
            .filter(|p| !self.delete_failures.contains(p))
            .collect()
    }

    /// Paths confirmed unique after comparison
    pub fn kept(&self) -> Vec<PathBuf> {
        self.paths_in_state(PathState::Kept)
    }

    /// Paths ignored because they failed to load
    pub fn skipped(&self) -> Vec<PathBuf> {
        self.paths_in_state(PathState::Skipped)
    }

    /// All paths not deleted by this pass
    pub fn survivors(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .zip(&self.states)
            .filter(|(_, s)| **s != PathState::Deleted)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

/// Outcome of a rename or sanity-check pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameReport {
    /// `(old, new)` pairs that were renamed
    pub renamed: Vec<(PathBuf, PathBuf)>,

    /// Paths that already followed the naming convention
    pub unchanged: usize,

    /// Paths whose rename failed
    pub failed: Vec<PathBuf>,
}

/// Summary of a full deduplicate-and-rename run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Number of images found before deduplication
    pub discovered: usize,

    /// Result of the comparison pass
    pub report: DedupeReport,

    /// Result of the rename pass, if renaming was enabled
    pub renamed: Option<RenameReport>,

    /// Result of the sanity-check pass, if renaming was enabled
    pub sanity_fixed: Option<RenameReport>,

    /// Expired log archives removed at the end of the run
    pub archives_removed: Vec<PathBuf>,
}
