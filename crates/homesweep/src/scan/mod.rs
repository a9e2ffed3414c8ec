//! Category scanners. Each one reads a single well-known location, sizes what it
//! finds with the walk in [`crate::walk`], and returns entries sorted largest
//! first with zero-size results dropped.

pub mod apps;
pub mod cache;
pub mod hidden;
pub mod logs;
pub mod ml;
pub mod projects;
pub mod trash;

pub use apps::scan_app_support;
pub use cache::{is_excluded, scan_caches};
pub use hidden::scan_hidden;
pub use logs::scan_logs;
pub use ml::{scan_ml_caches, scan_ml_root, MlCacheReport, UNUSED_AFTER_DAYS};
pub use projects::{scan_project_artifacts, ARTIFACT_PATTERNS};
pub use trash::scan_trash;

use std::fs;
use std::path::{Path, PathBuf};

/// Immediate children of `root` that resolve to directories.
pub(crate) fn child_dirs(root: &Path) -> Vec<PathBuf> {
    children(root).into_iter().filter(|p| p.is_dir()).collect()
}

/// Immediate children of `root`. An unreadable root yields nothing.
pub(crate) fn children(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read directory {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                log::debug!("Skipping entry in {}: {}", root.display(), e);
                None
            }
        })
        .collect()
}
