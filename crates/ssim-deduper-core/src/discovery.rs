use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// List all images under `directory` whose file name ends with one of `extensions`.
///
/// Matching is a case-insensitive suffix match; extensions may be given with or
/// without the leading dot. The result is sorted so repeated runs examine the
/// files in the same order.
pub fn list_images<S: AsRef<str>>(
    directory: &Path,
    extensions: &[S],
    max_depth: Option<usize>,
) -> Result<Vec<PathBuf>> {
    // Check if directory exists
    if !directory.is_dir() {
        return Err(Error::FileNotFound(directory.to_path_buf()));
    }

    let suffixes = normalize_extensions(extensions);
    let max_depth = max_depth.unwrap_or(usize::MAX);

    let mut images = Vec::new();

    for entry in WalkDir::new(directory).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Log error but continue with other files
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if has_extension(entry.path(), &suffixes) {
            images.push(entry.into_path());
        }
    }

    images.sort();
    Ok(images)
}

/// Lower-case every extension and give it a leading dot
fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .collect()
}

/// Returns if the file name of `path` ends with one of the normalized suffixes
fn has_extension(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .map(|name| suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())))
        .unwrap_or(false)
}

// -- Tests --
