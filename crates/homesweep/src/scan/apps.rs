use super::child_dirs;
use crate::model::{finalize_entries, EntryKind, ScanEntry};
use crate::platform::PathCatalog;
use crate::walk::size_of;
use rayon::prelude::*;
use std::collections::HashSet;

/// Size application-support folders and flag those with no installed owner.
///
/// `installed` holds lowercased application identifiers. Matching is by folder
/// name only, so the flag is a hint rather than a verdict.
pub fn scan_app_support(catalog: &PathCatalog, installed: &HashSet<String>) -> Vec<ScanEntry> {
    let root = catalog.app_support_root();
    if !root.exists() {
        log::warn!("Application support directory not found: {}", root.display());
        return Vec::new();
    }

    let entries: Vec<ScanEntry> = child_dirs(&root)
        .into_par_iter()
        .map(|dir| {
            let size = size_of(&dir);
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let possibly_orphaned = !installed.contains(&name);
            ScanEntry::new(&dir, EntryKind::OrphanedApp { possibly_orphaned }, size)
        })
        .collect();

    let entries = finalize_entries(entries);
    log::info!(
        "Found {} application data directories ({} possibly orphaned)",
        entries.len(),
        entries.iter().filter(|e| e.possibly_orphaned()).count()
    );
    entries
}
