use super::children;
use crate::model::{finalize_entries, mb_to_bytes, EntryKind, ScanEntry};
use crate::platform::PathCatalog;
use crate::walk::size_of;
use rayon::prelude::*;
use std::fs;

/// Hidden entries directly under home whose size is at least `min_size_mb`.
pub fn scan_hidden(catalog: &PathCatalog, min_size_mb: f64) -> Vec<ScanEntry> {
    let min_bytes = mb_to_bytes(min_size_mb);

    let hidden: Vec<_> = children(catalog.home())
        .into_iter()
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .collect();

    let entries: Vec<ScanEntry> = hidden
        .into_par_iter()
        .filter_map(|path| {
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    log::debug!("Skipping {}: {}", path.display(), e);
                    return None;
                }
            };

            let (kind, size) = if metadata.is_file() {
                (EntryKind::HiddenFile, metadata.len())
            } else if metadata.is_dir() {
                (EntryKind::HiddenDir, size_of(&path))
            } else {
                return None;
            };

            (size >= min_bytes).then(|| ScanEntry::new(&path, kind, size))
        })
        .collect();

    let entries = finalize_entries(entries);
    log::info!("Found {} hidden entries over {} MB", entries.len(), min_size_mb);
    entries
}
