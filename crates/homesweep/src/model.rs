//! Classified filesystem entries produced by the category scanners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
pub const BYTES_PER_GB: f64 = BYTES_PER_MB * 1024.0;

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

pub fn mb_to_bytes(mb: f64) -> u64 {
    if mb <= 0.0 {
        0
    } else {
        (mb * BYTES_PER_MB) as u64
    }
}

/// ML framework whose on-disk cache layout an entry was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MlFramework {
    #[serde(rename = "huggingface")]
    HuggingFace,
    #[serde(rename = "pytorch")]
    PyTorch,
    #[serde(rename = "tensorflow")]
    TensorFlow,
}

impl MlFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            MlFramework::HuggingFace => "huggingface",
            MlFramework::PyTorch => "pytorch",
            MlFramework::TensorFlow => "tensorflow",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "huggingface" => Ok(MlFramework::HuggingFace),
            "pytorch" => Ok(MlFramework::PyTorch),
            "tensorflow" => Ok(MlFramework::TensorFlow),
            _ => Err(format!("Invalid ML framework: {}", s)),
        }
    }
}

/// Category of a scan entry together with its category-specific metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EntryKind {
    Cache,
    OrphanedApp { possibly_orphaned: bool },
    HiddenFile,
    HiddenDir,
    ProjectArtifact { pattern: String },
    Log,
    MlModel { framework: MlFramework },
    MlDataset { framework: MlFramework },
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Cache => "cache",
            EntryKind::OrphanedApp { .. } => "orphaned_app",
            EntryKind::HiddenFile => "hidden_file",
            EntryKind::HiddenDir => "hidden_dir",
            EntryKind::ProjectArtifact { .. } => "project_artifact",
            EntryKind::Log => "log",
            EntryKind::MlModel { .. } => "ml_model",
            EntryKind::MlDataset { .. } => "ml_dataset",
        }
    }

    /// Grouping label for ML entries, e.g. `huggingface` or `pytorch_dataset`.
    pub fn ml_cache_type(&self) -> Option<String> {
        match self {
            EntryKind::MlModel { framework } => Some(framework.as_str().to_string()),
            EntryKind::MlDataset { framework } => Some(format!("{}_dataset", framework.as_str())),
            _ => None,
        }
    }
}

/// One classified filesystem object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub name: String,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl ScanEntry {
    /// Build an entry named after the final path component.
    pub fn new(path: &Path, kind: EntryKind, size_bytes: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            path: path.to_path_buf(),
            name,
            kind,
            size_bytes,
            last_accessed: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_last_accessed(mut self, last_accessed: Option<DateTime<Utc>>) -> Self {
        self.last_accessed = last_accessed;
        self
    }

    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }

    pub fn category(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn possibly_orphaned(&self) -> bool {
        matches!(self.kind, EntryKind::OrphanedApp { possibly_orphaned: true })
    }
}

/// Project artifacts grouped by the pattern that matched them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactGroup {
    pub pattern: String,
    pub count: usize,
    pub total_size_bytes: u64,
    /// First matches only, for display.
    pub items: Vec<ScanEntry>,
}

impl ArtifactGroup {
    pub fn total_size_mb(&self) -> f64 {
        bytes_to_mb(self.total_size_bytes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrashSummary {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub count: usize,
}

impl TrashSummary {
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            size_bytes: 0,
            count: 0,
        }
    }

    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }
}

/// Category scanner outputs keyed the way reports group them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResults {
    #[serde(default)]
    pub caches: Vec<ScanEntry>,
    #[serde(default)]
    pub orphaned_apps: Vec<ScanEntry>,
    #[serde(default)]
    pub hidden_files: Vec<ScanEntry>,
    #[serde(default)]
    pub project_artifacts: Vec<ArtifactGroup>,
    #[serde(default)]
    pub logs: Vec<ScanEntry>,
    #[serde(default)]
    pub trash: TrashSummary,
}

impl ScanResults {
    /// Combined size of caches, application data and hidden entries.
    pub fn total_size_bytes(&self) -> u64 {
        self.caches
            .iter()
            .chain(self.orphaned_apps.iter())
            .chain(self.hidden_files.iter())
            .map(|e| e.size_bytes)
            .sum()
    }
}

/// Sort descending by size and drop zero-size entries.
pub(crate) fn finalize_entries(mut entries: Vec<ScanEntry>) -> Vec<ScanEntry> {
    entries.retain(|e| e.size_bytes > 0);
    entries.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_from_path() {
        let entry = ScanEntry::new(Path::new("/home/u/.cache/AppX"), EntryKind::Cache, 10);
        assert_eq!(entry.name, "AppX");
        assert_eq!(entry.category(), "cache");
    }

    #[test]
    fn test_size_mb_conversion() {
        let entry = ScanEntry::new(Path::new("/x"), EntryKind::Log, 55 * 1024 * 1024);
        assert_eq!(entry.size_mb(), 55.0);
        assert_eq!(mb_to_bytes(1.5), 1_572_864);
        assert_eq!(mb_to_bytes(-3.0), 0);
    }

    #[test]
    fn test_entry_kind_serializes_flat() {
        let entry = ScanEntry::new(
            Path::new("/apps/Slack"),
            EntryKind::OrphanedApp { possibly_orphaned: true },
            2048,
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["category"], "orphaned_app");
        assert_eq!(value["possibly_orphaned"], true);
        assert_eq!(value["size_bytes"], 2048);
        assert!(value.get("last_accessed").is_none());

        let back: ScanEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_ml_cache_type_labels() {
        let model = EntryKind::MlModel { framework: MlFramework::PyTorch };
        let dataset = EntryKind::MlDataset { framework: MlFramework::HuggingFace };
        assert_eq!(model.ml_cache_type().as_deref(), Some("pytorch"));
        assert_eq!(dataset.ml_cache_type().as_deref(), Some("huggingface_dataset"));
        assert_eq!(EntryKind::Cache.ml_cache_type(), None);
    }

    #[test]
    fn test_finalize_entries_sorts_and_drops_empty() {
        let entries = vec![
            ScanEntry::new(Path::new("/a"), EntryKind::Cache, 5),
            ScanEntry::new(Path::new("/b"), EntryKind::Cache, 0),
            ScanEntry::new(Path::new("/c"), EntryKind::Cache, 50),
        ];
        let result = finalize_entries(entries);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "c");
        assert_eq!(result[1].name, "a");
    }
}
