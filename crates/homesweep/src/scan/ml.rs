//! Downloaded model and dataset caches.
//!
//! Each cache root is dispatched on its directory name:
//! - `huggingface`: `hub/models--<org>--<name>` directories, reported as `org/name`
//! - `torch`: checkpoint files under `hub/checkpoints`
//! - `tensorflow` / `keras`: directories under `saved_models`
//!
//! Every framework may also keep a `datasets/` directory of dataset folders.

use super::{child_dirs, children};
use crate::model::{bytes_to_mb, EntryKind, MlFramework, ScanEntry, BYTES_PER_GB};
use crate::platform::PathCatalog;
use crate::walk::{last_accessed, size_of};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Entries not touched for longer than this are reported as unused.
pub const UNUSED_AFTER_DAYS: i64 = 30;

pub fn framework_for_root(root: &Path) -> Option<MlFramework> {
    let name = root.file_name()?.to_string_lossy().to_lowercase();
    if name.contains("huggingface") {
        Some(MlFramework::HuggingFace)
    } else if name.contains("torch") {
        Some(MlFramework::PyTorch)
    } else if name.contains("tensorflow") || name.contains("keras") {
        Some(MlFramework::TensorFlow)
    } else {
        None
    }
}

fn entry_for(path: &Path, kind: EntryKind, size: u64) -> Option<ScanEntry> {
    (size > 0).then(|| ScanEntry::new(path, kind, size).with_last_accessed(last_accessed(path)))
}

fn hub_name(dir_name: &str) -> String {
    dir_name.replace("models--", "").replace("--", "/")
}

fn scan_datasets(root: &Path, framework: MlFramework) -> Vec<ScanEntry> {
    let datasets = root.join("datasets");
    if !datasets.is_dir() {
        return Vec::new();
    }

    child_dirs(&datasets)
        .into_iter()
        .filter_map(|dir| {
            let name = format!("dataset:{}", dir.file_name()?.to_string_lossy());
            entry_for(&dir, EntryKind::MlDataset { framework }, size_of(&dir))
                .map(|e| e.with_name(name))
        })
        .collect()
}

fn scan_huggingface(root: &Path) -> Vec<ScanEntry> {
    let framework = MlFramework::HuggingFace;
    let hub = root.join("hub");
    let mut entries = Vec::new();

    if hub.is_dir() {
        for dir in child_dirs(&hub) {
            let dir_name = match dir.file_name() {
                Some(n) => n.to_string_lossy().to_string(),
                None => continue,
            };
            if !dir_name.contains("--") {
                continue;
            }
            if let Some(entry) = entry_for(&dir, EntryKind::MlModel { framework }, size_of(&dir)) {
                entries.push(entry.with_name(hub_name(&dir_name)));
            }
        }
    }

    entries.extend(scan_datasets(root, framework));
    entries
}

fn scan_pytorch(root: &Path) -> Vec<ScanEntry> {
    let framework = MlFramework::PyTorch;
    let checkpoints = root.join("hub").join("checkpoints");
    let mut entries = Vec::new();

    if checkpoints.is_dir() {
        for file in children(&checkpoints) {
            let size = match fs::metadata(&file) {
                Ok(m) if m.is_file() => m.len(),
                _ => continue,
            };
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            if let Some(entry) = entry_for(&file, EntryKind::MlModel { framework }, size) {
                entries.push(entry.with_name(stem));
            }
        }
    }

    entries.extend(scan_datasets(root, framework));
    entries
}

fn scan_tensorflow(root: &Path) -> Vec<ScanEntry> {
    let framework = MlFramework::TensorFlow;
    let saved_models = root.join("saved_models");
    let mut entries = Vec::new();

    if saved_models.is_dir() {
        for dir in child_dirs(&saved_models) {
            entries.extend(entry_for(&dir, EntryKind::MlModel { framework }, size_of(&dir)));
        }
    }

    entries.extend(scan_datasets(root, framework));
    entries
}

/// Models and datasets under one cache root. Unrecognized roots yield nothing.
pub fn scan_ml_root(root: &Path) -> Vec<ScanEntry> {
    let entries = match framework_for_root(root) {
        Some(MlFramework::HuggingFace) => scan_huggingface(root),
        Some(MlFramework::PyTorch) => scan_pytorch(root),
        Some(MlFramework::TensorFlow) => scan_tensorflow(root),
        None => {
            log::debug!("No ML layout known for {}", root.display());
            Vec::new()
        }
    };

    log::info!("Found {} models/datasets in {}", entries.len(), root.display());
    entries
}

pub fn scan_ml_caches(catalog: &PathCatalog) -> Vec<ScanEntry> {
    let roots = catalog.ml_cache_roots();
    log::info!("Scanning {} ML cache directories", roots.len());
    roots.iter().flat_map(|root| scan_ml_root(root)).collect()
}

/// Unused iff last access is strictly older than the cutoff.
pub fn is_unused(entry: &ScanEntry, cutoff: DateTime<Utc>) -> bool {
    entry.last_accessed.map(|t| t < cutoff).unwrap_or(false)
}

pub fn unused_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(UNUSED_AFTER_DAYS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlCacheReport {
    pub total_models: usize,
    pub total_size_bytes: u64,
    pub unused_models_count: usize,
    pub unused_size_bytes: u64,
    /// Entries last accessed before this instant count as unused.
    pub unused_cutoff: DateTime<Utc>,
    /// Largest first.
    pub models: Vec<ScanEntry>,
}

impl MlCacheReport {
    pub fn from_entries(mut entries: Vec<ScanEntry>, now: DateTime<Utc>) -> Self {
        entries.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        let cutoff = unused_cutoff(now);

        let (unused_models_count, unused_size_bytes) = entries
            .iter()
            .filter(|e| is_unused(e, cutoff))
            .fold((0usize, 0u64), |(count, size), e| (count + 1, size + e.size_bytes));

        Self {
            total_models: entries.len(),
            total_size_bytes: entries.iter().map(|e| e.size_bytes).sum(),
            unused_models_count,
            unused_size_bytes,
            unused_cutoff: cutoff,
            models: entries,
        }
    }

    pub fn unused_models(&self) -> impl Iterator<Item = &ScanEntry> {
        self.models
            .iter()
            .filter(move |e| is_unused(e, self.unused_cutoff))
    }

    /// Entries grouped by cache type label, e.g. `huggingface_dataset`.
    pub fn by_type(&self) -> BTreeMap<String, Vec<&ScanEntry>> {
        let mut groups: BTreeMap<String, Vec<&ScanEntry>> = BTreeMap::new();
        for entry in &self.models {
            if let Some(label) = entry.kind.ml_cache_type() {
                groups.entry(label).or_default().push(entry);
            }
        }
        groups
    }

    pub fn total_size_gb(&self) -> f64 {
        self.total_size_bytes as f64 / BYTES_PER_GB
    }

    pub fn unused_size_mb(&self) -> f64 {
        bytes_to_mb(self.unused_size_bytes)
    }
}
