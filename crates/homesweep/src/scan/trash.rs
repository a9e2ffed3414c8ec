use super::children;
use crate::model::TrashSummary;
use crate::platform::PathCatalog;
use crate::walk::size_of;

/// Total size and direct child count of the trash. Absent trash is all zeros.
pub fn scan_trash(catalog: &PathCatalog) -> TrashSummary {
    let root = catalog.trash_root();
    if !root.exists() {
        log::debug!("Trash directory not found: {}", root.display());
        return TrashSummary::empty(&root);
    }

    let summary = TrashSummary {
        size_bytes: size_of(&root),
        count: children(&root).len(),
        path: root,
    };

    log::info!("Trash holds {} items ({} bytes)", summary.count, summary.size_bytes);
    summary
}
