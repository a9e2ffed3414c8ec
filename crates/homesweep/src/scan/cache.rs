use super::child_dirs;
use crate::model::{finalize_entries, EntryKind, ScanEntry};
use crate::platform::PathCatalog;
use crate::walk::size_of;
use rayon::prelude::*;
use std::path::Path;

/// True when the path string contains any non-empty exclusion substring.
pub fn is_excluded(path: &Path, exclude_paths: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    exclude_paths
        .iter()
        .filter(|e| !e.is_empty())
        .any(|e| path_str.contains(e.as_str()))
}

/// Size each immediate subdirectory of the cache root.
pub fn scan_caches(catalog: &PathCatalog, exclude_paths: &[String]) -> Vec<ScanEntry> {
    let root = catalog.cache_root();
    if !root.exists() {
        log::warn!("Cache directory not found: {}", root.display());
        return Vec::new();
    }

    let entries: Vec<ScanEntry> = child_dirs(&root)
        .into_par_iter()
        .filter(|dir| !is_excluded(dir, exclude_paths))
        .map(|dir| {
            let size = size_of(&dir);
            ScanEntry::new(&dir, EntryKind::Cache, size)
        })
        .collect();

    let entries = finalize_entries(entries);
    log::info!("Found {} cache directories in {}", entries.len(), root.display());
    entries
}
