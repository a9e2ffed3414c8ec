use crate::error::Result;
use crate::model::{ArtifactGroup, EntryKind, ScanEntry};
use crate::walk::size_of;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Build and packaging leftovers, matched against entry names anywhere below
/// the projects directory.
pub const ARTIFACT_PATTERNS: &[&str] = &[
    "__pycache__",
    ".pytest_cache",
    ".DS_Store",
    "node_modules",
    "venv",
    ".venv",
    "*.pyc",
    ".mypy_cache",
    ".ruff_cache",
    "dist",
    "build",
    "*.egg-info",
];

/// Examples kept per group for display.
pub const MAX_GROUP_ITEMS: usize = 10;

fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Find artifacts under `projects_dir` and group them by matching pattern.
///
/// By default matches inside an already matched directory are counted again,
/// both within a pattern (nested `node_modules`) and across patterns
/// (`__pycache__` inside `.venv`). With `exclusive` set, a matched directory is
/// not descended into.
pub fn scan_project_artifacts(
    projects_dir: &Path,
    extra_patterns: &[String],
    exclusive: bool,
) -> Result<Vec<ArtifactGroup>> {
    if !projects_dir.exists() {
        log::warn!("Projects directory not found: {}", projects_dir.display());
        return Ok(Vec::new());
    }

    let patterns: Vec<String> = ARTIFACT_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .chain(extra_patterns.iter().cloned())
        .collect();
    let matcher = build_matcher(&patterns)?;

    let mut matches: HashMap<usize, Vec<ScanEntry>> = HashMap::new();
    let mut walker = WalkDir::new(projects_dir)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Walk error during artifact scan: {}", e);
                continue;
            }
        };

        let hits = matcher.matches(entry.file_name());
        if hits.is_empty() {
            continue;
        }

        let is_dir = entry.file_type().is_dir();
        let size = if is_dir {
            size_of(entry.path())
        } else if entry.file_type().is_file() {
            entry.metadata().map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        if size > 0 {
            for index in hits {
                let kind = EntryKind::ProjectArtifact {
                    pattern: patterns[index].clone(),
                };
                matches
                    .entry(index)
                    .or_default()
                    .push(ScanEntry::new(entry.path(), kind, size));
            }
        }

        if exclusive && is_dir {
            walker.skip_current_dir();
        }
    }

    let mut groups: Vec<ArtifactGroup> = matches
        .into_iter()
        .map(|(index, mut items)| {
            let count = items.len();
            let total_size_bytes = items.iter().map(|i| i.size_bytes).sum();
            items.truncate(MAX_GROUP_ITEMS);
            ArtifactGroup {
                pattern: patterns[index].clone(),
                count,
                total_size_bytes,
                items,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.total_size_bytes
            .cmp(&a.total_size_bytes)
            .then_with(|| a.pattern.cmp(&b.pattern))
    });

    log::info!(
        "Found {} artifact groups in {}",
        groups.len(),
        projects_dir.display()
    );
    Ok(groups)
}
