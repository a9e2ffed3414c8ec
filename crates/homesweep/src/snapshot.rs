//! Persisted audit results. The JSON layout is the only state homesweep keeps
//! between runs: `homesweep scan --save-results` writes it and
//! `homesweep report --from-scan` reads it back.

use crate::cleanup::CleanupAnalysis;
use crate::deps::DependencyReport;
use crate::error::{HomesweepError, Result};
use crate::model::ScanResults;
use crate::scan::MlCacheReport;
use crate::security::SecurityReport;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditResults {
    #[serde(default)]
    pub scan_results: ScanResults,
    #[serde(default)]
    pub security_results: SecurityReport,
    #[serde(default)]
    pub cleanup_analysis: CleanupAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_cache_results: Option<MlCacheReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_results: Option<DependencyReport>,
}

pub fn save_snapshot<P: AsRef<Path>>(results: &AuditResults, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)?;
    log::info!("Saved scan results to {}", path.display());
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<AuditResults> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HomesweepError::SnapshotNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::analyze_cleanup;
    use crate::model::{ArtifactGroup, EntryKind, MlFramework, ScanEntry, TrashSummary};
    use crate::security::{IssueCategory, SecurityIssue, SensitiveFile, Severity};
    use chrono::{Duration, TimeZone, Utc};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_results() -> AuditResults {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let scan_results = ScanResults {
            caches: vec![ScanEntry::new(Path::new("/h/.cache/pip"), EntryKind::Cache, 73_400_320)],
            orphaned_apps: vec![ScanEntry::new(
                Path::new("/h/.local/share/old"),
                EntryKind::OrphanedApp { possibly_orphaned: true },
                1_234,
            )],
            project_artifacts: vec![ArtifactGroup {
                pattern: "node_modules".to_string(),
                count: 2,
                total_size_bytes: 3_145_728,
                items: vec![ScanEntry::new(
                    Path::new("/h/development/web/node_modules"),
                    EntryKind::ProjectArtifact { pattern: "node_modules".to_string() },
                    3_145_728,
                )],
            }],
            trash: TrashSummary {
                path: PathBuf::from("/h/.local/share/Trash"),
                size_bytes: 12_582_912,
                count: 3,
            },
            ..Default::default()
        };

        let model = ScanEntry::new(
            Path::new("/h/.cache/huggingface/hub/models--org--m"),
            EntryKind::MlModel { framework: MlFramework::HuggingFace },
            987_758_592,
        )
        .with_name("org/m")
        .with_last_accessed(Some(now - Duration::days(45)));
        let ml = MlCacheReport::from_entries(vec![model], now);

        let security_results = SecurityReport::new(
            vec![SecurityIssue {
                severity: Severity::High,
                category: IssueCategory::SshPermissions,
                path: PathBuf::from("/h/.ssh"),
                description: "Incorrect permissions on SSH directory: drwxr-xr-x".to_string(),
                recommendation: Some("Run: chmod 700 /h/.ssh".to_string()),
            }],
            vec![SensitiveFile {
                path: PathBuf::from("/h/development/app/.env"),
                pattern: "*.env".to_string(),
                size_bytes: 12,
            }],
        );

        AuditResults {
            cleanup_analysis: analyze_cleanup(&scan_results, Some(&ml)),
            scan_results,
            security_results,
            ml_cache_results: Some(ml),
            dependency_results: None,
        }
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/results.json");
        let results = sample_results();

        save_snapshot(&results, &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(loaded, results);
        assert_eq!(
            loaded.cleanup_analysis.total_reclaimable_mb,
            results.cleanup_analysis.total_reclaimable_mb
        );
    }

    #[test]
    fn test_top_level_keys() {
        let value = serde_json::to_value(sample_results()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(keys.contains(&"scan_results"));
        assert!(keys.contains(&"security_results"));
        assert!(keys.contains(&"cleanup_analysis"));
        assert!(keys.contains(&"ml_cache_results"));
        assert!(!keys.contains(&"dependency_results"));
    }

    #[test]
    fn test_load_missing_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_snapshot(temp_dir.path().join("none.json"));
        assert!(matches!(result, Err(HomesweepError::SnapshotNotFound(_))));
    }

    #[test]
    fn test_load_minimal_snapshot_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("min.json");
        fs::write(&path, r#"{"scan_results": {"caches": []}}"#).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert!(loaded.ml_cache_results.is_none());
        assert_eq!(loaded.cleanup_analysis.total_items, 0);
    }
}
