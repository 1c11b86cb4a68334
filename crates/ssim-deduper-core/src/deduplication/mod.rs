//! # Pairwise Deduplication
//!
//! A single forward pass over an ordered list of paths. Each path in turn is
//! loaded as the reference image and compared against every later path that
//! has not been resolved yet. A candidate whose best similarity over its four
//! orientations exceeds [`DUPLICATE_THRESHOLD`] forms a duplicate pair with
//! the reference, and the member with the smaller pixel area is removed. On a
//! resolution tie the earlier path survives.
//!
//! Candidates of one reference are loaded and scored in parallel, one chunk
//! at a time. Decisions are applied strictly in list order after a chunk has
//! been scored, so the outcome is the same as a sequential pass. Without a
//! thread pool candidates are evaluated one at a time.

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::logging::{log_delete_error, log_duplicate, log_load_error};
use crate::processing::{rotate, similarity, ImageLoader, ImageRecord, Orientation};
use crate::safety::FileRemover;
use crate::types::{DedupeReport, DuplicateDecision, PathState};

/// Similarity above which two images are treated as duplicates
pub const DUPLICATE_THRESHOLD: f64 = 0.95;

/// Which member of a duplicate pair survives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Survivor {
    /// The earlier (reference) image is kept, the candidate is removed
    Earlier,
    /// The later (candidate) image is kept, the reference is removed
    Later,
}

/// Resolution policy: the larger pixel area wins, ties keep the earlier image
pub fn choose_survivor(earlier_resolution: u64, later_resolution: u64) -> Survivor {
    if earlier_resolution >= later_resolution {
        Survivor::Earlier
    } else {
        Survivor::Later
    }
}

/// Best similarity of `reference` against the four orientations of `candidate`.
///
/// Only the candidate is rotated. An orientation whose shape differs from the
/// reference contributes 0, as does a differing channel count.
pub fn compare_with_orientations(reference: &ImageRecord, candidate: &ImageRecord) -> f64 {
    if reference.channels != candidate.channels {
        return 0.0;
    }

    let target = reference.gray.dimensions();
    Orientation::ALL.iter().fold(0.0_f64, |best, &orientation| {
        if orientation.rotated_dimensions(candidate.gray.dimensions()) != target {
            return best;
        }
        let rotated = rotate(&candidate.gray, orientation);
        best.max(similarity(&reference.gray, &rotated))
    })
}

type Scorer = fn(&ImageRecord, &ImageRecord) -> f64;

/// Score of one candidate against the current reference
enum Evaluation {
    Scored { resolution: u64, similarity: f64 },
    LoadFailed,
}

/// Pairwise deduplicator over an injected loader and deletion primitive
pub struct Deduplicator<L, R> {
    loader: L,
    remover: R,
    threads: usize,
    batch_size: usize,
    progress: ProgressBar,
    scorer: Scorer,
}

impl<L: ImageLoader, R: FileRemover> Deduplicator<L, R> {
    /// Create a deduplicator that evaluates candidates sequentially
    pub fn new(loader: L, remover: R) -> Self {
        Self {
            loader,
            remover,
            threads: 1,
            batch_size: 1,
            progress: ProgressBar::hidden(),
            scorer: compare_with_orientations,
        }
    }

    /// Configure the number of threads used to score candidates
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Configure how many candidates are loaded and scored together
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Report progress of the outer loop on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    #[cfg(test)]
    fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Run one deduplication pass over `paths`.
    ///
    /// Never fails: unreadable images are skipped and failed removals are
    /// logged. A path whose removal failed is still treated as deleted.
    pub fn deduplicate(&self, paths: &[PathBuf]) -> DedupeReport {
        let pool = if self.threads > 1 && self.batch_size > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("Failed to build thread pool, comparing sequentially: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut pass = Pass {
            paths,
            states: vec![PathState::Unvisited; paths.len()],
            decisions: Vec::new(),
            delete_failures: Vec::new(),
        };

        self.progress.set_length(paths.len() as u64);

        for i in 0..paths.len() {
            self.progress.set_position(i as u64);
            if pass.states[i].is_resolved() {
                continue;
            }

            let reference = match self.loader.load(&paths[i]) {
                Ok(record) => record,
                Err(e) => {
                    log_load_error(&paths[i], &e);
                    pass.states[i] = PathState::Skipped;
                    continue;
                }
            };
            debug!(
                "Comparing {} ({}x{}) against later images",
                paths[i].display(),
                reference.width,
                reference.height
            );

            self.compare_reference(&mut pass, i, &reference, pool.as_ref());

            if pass.states[i] != PathState::Deleted {
                pass.states[i] = PathState::Kept;
            }
        }

        self.progress.finish_and_clear();

        info!(
            "Compared {} images: {} duplicates removed, {} unreadable",
            paths.len(),
            pass.decisions.len(),
            pass.states
                .iter()
                .filter(|s| **s == PathState::Skipped)
                .count()
        );

        DedupeReport {
            paths: paths.to_vec(),
            states: pass.states,
            decisions: pass.decisions,
            delete_failures: pass.delete_failures,
        }
    }

    /// Compare the loaded image at `i` against every unresolved later path
    fn compare_reference(
        &self,
        pass: &mut Pass<'_>,
        i: usize,
        reference: &ImageRecord,
        pool: Option<&rayon::ThreadPool>,
    ) {
        let paths = pass.paths;
        let candidates: Vec<usize> = (i + 1..paths.len())
            .filter(|&j| !pass.states[j].is_resolved())
            .collect();

        // Sequential passes never load a candidate after the reference is removed
        let chunk_size = if pool.is_some() { self.batch_size } else { 1 };

        for chunk in candidates.chunks(chunk_size) {
            let evaluations: Vec<Evaluation> = match pool {
                Some(pool) => pool.install(|| {
                    chunk
                        .par_iter()
                        .map(|&j| self.evaluate(reference, &paths[j]))
                        .collect()
                }),
                None => chunk
                    .iter()
                    .map(|&j| self.evaluate(reference, &paths[j]))
                    .collect(),
            };

            for (&j, evaluation) in chunk.iter().zip(evaluations) {
                let (resolution, score) = match evaluation {
                    Evaluation::Scored {
                        resolution,
                        similarity,
                    } => (resolution, similarity),
                    Evaluation::LoadFailed => continue,
                };

                if score <= DUPLICATE_THRESHOLD {
                    continue;
                }

                match choose_survivor(reference.resolution(), resolution) {
                    Survivor::Earlier => {
                        pass.remove(j, i, resolution, reference.resolution(), score, &self.remover);
                    }
                    Survivor::Later => {
                        pass.remove(i, j, reference.resolution(), resolution, score, &self.remover);
                        // The reference is gone; nothing left to compare it with
                        return;
                    }
                }
            }
        }
    }

    /// Load one candidate and score it against the reference
    fn evaluate(&self, reference: &ImageRecord, path: &Path) -> Evaluation {
        match self.loader.load(path) {
            Ok(candidate) => Evaluation::Scored {
                resolution: candidate.resolution(),
                similarity: (self.scorer)(reference, &candidate),
            },
            Err(e) => {
                log_load_error(path, &e);
                Evaluation::LoadFailed
            }
        }
    }
}

/// Mutable bookkeeping of one pass; only the deciding thread writes to it
struct Pass<'a> {
    paths: &'a [PathBuf],
    states: Vec<PathState>,
    decisions: Vec<DuplicateDecision>,
    delete_failures: Vec<PathBuf>,
}

impl Pass<'_> {
    /// Record the decision, attempt the removal once and resolve the path
    fn remove(
        &mut self,
        remove: usize,
        keep: usize,
        remove_resolution: u64,
        keep_resolution: u64,
        similarity: f64,
        remover: &dyn FileRemover,
    ) {
        let decision = DuplicateDecision {
            keep: self.paths[keep].clone(),
            keep_resolution,
            remove: self.paths[remove].clone(),
            remove_resolution,
            similarity,
        };
        log_duplicate(&decision);

        if let Err(e) = remover.remove(&decision.remove) {
            log_delete_error(&decision.remove, &e);
            self.delete_failures.push(decision.remove.clone());
        }

        self.states[remove] = PathState::Deleted;
        self.decisions.push(decision);
    }
}
