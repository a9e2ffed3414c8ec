use super::child_dirs;
use crate::model::{finalize_entries, EntryKind, ScanEntry};
use crate::platform::PathCatalog;
use crate::walk::size_of;
use rayon::prelude::*;

/// Size each immediate subdirectory of the logs root.
pub fn scan_logs(catalog: &PathCatalog) -> Vec<ScanEntry> {
    let root = catalog.logs_root();
    if !root.exists() {
        log::debug!("Logs directory not found: {}", root.display());
        return Vec::new();
    }

    let entries: Vec<ScanEntry> = child_dirs(&root)
        .into_par_iter()
        .map(|dir| {
            let size = size_of(&dir);
            ScanEntry::new(&dir, EntryKind::Log, size)
        })
        .collect();

    let entries = finalize_entries(entries);
    log::info!("Found {} log directories", entries.len());
    entries
}
