//! Cleanup ranking: a pure fold of category results into reclaim recommendations.

use crate::model::{ArtifactGroup, ScanEntry, ScanResults, TrashSummary};
use crate::scan::{MlCacheReport, UNUSED_AFTER_DAYS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cache entries below this size are not worth recommending.
pub const CACHE_MIN_MB: f64 = 50.0;
/// Log entries below this size are not worth recommending.
pub const LOG_MIN_MB: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    MlCache,
    Cache,
    ProjectArtifact,
    Trash,
    Log,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::MlCache => "ml_cache",
            RecommendationKind::Cache => "cache",
            RecommendationKind::ProjectArtifact => "project_artifact",
            RecommendationKind::Trash => "trash",
            RecommendationKind::Log => "log",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Low => "low",
            Risk::Medium => "medium",
            Risk::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Delete,
    Empty,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Delete => "delete",
            Action::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupRecommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub size_mb: f64,
    pub risk: Risk,
    pub action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanupAnalysis {
    pub recommendations: Vec<CleanupRecommendation>,
    pub total_reclaimable_mb: f64,
    pub total_items: usize,
}

impl CleanupAnalysis {
    pub fn total_reclaimable_gb(&self) -> f64 {
        self.total_reclaimable_mb / 1024.0
    }
}

/// One category's scan output, as seen by the ranker.
#[derive(Debug, Clone, Copy)]
pub enum CategoryResult<'a> {
    Caches(&'a [ScanEntry]),
    OrphanedApps(&'a [ScanEntry]),
    HiddenFiles(&'a [ScanEntry]),
    ProjectArtifacts(&'a [ArtifactGroup]),
    Trash(&'a TrashSummary),
    Logs(&'a [ScanEntry]),
    MlCache(&'a MlCacheReport),
}

impl CategoryResult<'_> {
    /// Reclaim recommendations this category contributes.
    ///
    /// Orphaned application data and hidden files are informational only.
    pub fn recommendations(&self) -> Vec<CleanupRecommendation> {
        match self {
            CategoryResult::MlCache(report) => {
                if report.unused_size_bytes == 0 {
                    return Vec::new();
                }
                vec![CleanupRecommendation {
                    kind: RecommendationKind::MlCache,
                    path: None,
                    name: "Unused ML models".to_string(),
                    description: format!(
                        "{} models not used for more than {} days",
                        report.unused_models_count, UNUSED_AFTER_DAYS
                    ),
                    count: Some(report.unused_models_count),
                    size_mb: report.unused_size_mb(),
                    risk: Risk::Low,
                    action: Action::Delete,
                }]
            }
            CategoryResult::Caches(entries) => entries
                .iter()
                .filter(|e| e.size_mb() >= CACHE_MIN_MB)
                .map(|e| CleanupRecommendation {
                    kind: RecommendationKind::Cache,
                    path: Some(e.path.clone()),
                    name: e.name.clone(),
                    description: format!("Cache: {}", e.name),
                    count: None,
                    size_mb: e.size_mb(),
                    risk: Risk::Low,
                    action: Action::Delete,
                })
                .collect(),
            CategoryResult::ProjectArtifacts(groups) => groups
                .iter()
                .map(|g| CleanupRecommendation {
                    kind: RecommendationKind::ProjectArtifact,
                    path: None,
                    name: g.pattern.clone(),
                    description: format!("Project artifacts: {} ({} items)", g.pattern, g.count),
                    count: Some(g.count),
                    size_mb: g.total_size_mb(),
                    risk: Risk::Low,
                    action: Action::Delete,
                })
                .collect(),
            CategoryResult::Trash(trash) => {
                if trash.size_bytes == 0 {
                    return Vec::new();
                }
                vec![CleanupRecommendation {
                    kind: RecommendationKind::Trash,
                    path: Some(trash.path.clone()),
                    name: "Trash".to_string(),
                    description: format!("Trash ({} items)", trash.count),
                    count: Some(trash.count),
                    size_mb: trash.size_mb(),
                    risk: Risk::Low,
                    action: Action::Empty,
                }]
            }
            CategoryResult::Logs(entries) => entries
                .iter()
                .filter(|e| e.size_mb() >= LOG_MIN_MB)
                .map(|e| CleanupRecommendation {
                    kind: RecommendationKind::Log,
                    path: Some(e.path.clone()),
                    name: e.name.clone(),
                    description: format!("Logs: {}", e.name),
                    count: None,
                    size_mb: e.size_mb(),
                    risk: Risk::Low,
                    action: Action::Delete,
                })
                .collect(),
            CategoryResult::OrphanedApps(_) | CategoryResult::HiddenFiles(_) => Vec::new(),
        }
    }
}

/// Category view of a full scan, in ranking order.
pub fn categories<'a>(
    scan: &'a ScanResults,
    ml_cache: Option<&'a MlCacheReport>,
) -> Vec<CategoryResult<'a>> {
    let mut out = Vec::with_capacity(7);
    if let Some(report) = ml_cache {
        out.push(CategoryResult::MlCache(report));
    }
    out.push(CategoryResult::Caches(&scan.caches));
    out.push(CategoryResult::OrphanedApps(&scan.orphaned_apps));
    out.push(CategoryResult::HiddenFiles(&scan.hidden_files));
    out.push(CategoryResult::ProjectArtifacts(&scan.project_artifacts));
    out.push(CategoryResult::Trash(&scan.trash));
    out.push(CategoryResult::Logs(&scan.logs));
    out
}

/// Merge every category's recommendations, largest first.
///
/// The total is summed over the final list, so it always equals the sum of
/// the reported sizes. Overlapping artifact groups are not de-duplicated.
pub fn rank(categories: &[CategoryResult<'_>]) -> CleanupAnalysis {
    let mut recommendations: Vec<CleanupRecommendation> =
        categories.iter().flat_map(|c| c.recommendations()).collect();

    recommendations.sort_by(|a, b| b.size_mb.total_cmp(&a.size_mb));

    let total_reclaimable_mb = recommendations.iter().map(|r| r.size_mb).sum();

    CleanupAnalysis {
        total_items: recommendations.len(),
        total_reclaimable_mb,
        recommendations,
    }
}

pub fn analyze_cleanup(scan: &ScanResults, ml_cache: Option<&MlCacheReport>) -> CleanupAnalysis {
    let analysis = rank(&categories(scan, ml_cache));
    log::info!(
        "{} cleanup recommendations, {:.2} MB reclaimable",
        analysis.total_items,
        analysis.total_reclaimable_mb
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{mb_to_bytes, EntryKind};
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use std::path::Path;

    fn entry(name: &str, kind: EntryKind, mb: f64) -> ScanEntry {
        ScanEntry::new(&Path::new("/h").join(name), kind, mb_to_bytes(mb))
    }

    fn group(pattern: &str, count: usize, mb: f64) -> ArtifactGroup {
        ArtifactGroup {
            pattern: pattern.to_string(),
            count,
            total_size_bytes: mb_to_bytes(mb),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_empty_scan_has_nothing_to_reclaim() {
        let analysis = analyze_cleanup(&ScanResults::default(), None);
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.total_reclaimable_mb, 0.0);
        assert_eq!(analysis.total_items, 0);
    }

    #[test]
    fn test_thresholds() {
        let scan = ScanResults {
            caches: vec![
                entry("big-cache", EntryKind::Cache, 50.0),
                entry("small-cache", EntryKind::Cache, 49.9),
            ],
            logs: vec![
                entry("big-log", EntryKind::Log, 100.0),
                entry("small-log", EntryKind::Log, 99.0),
            ],
            orphaned_apps: vec![entry(
                "gone",
                EntryKind::OrphanedApp { possibly_orphaned: true },
                500.0,
            )],
            hidden_files: vec![entry(".huge", EntryKind::HiddenDir, 900.0)],
            ..Default::default()
        };

        let analysis = analyze_cleanup(&scan, None);
        let names: Vec<_> = analysis.recommendations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["big-log", "big-cache"]);
        assert_eq!(analysis.total_reclaimable_mb, 150.0);
    }

    #[test]
    fn test_trash_and_artifacts() {
        let scan = ScanResults {
            project_artifacts: vec![group("node_modules", 3, 300.0), group("__pycache__", 9, 2.0)],
            trash: TrashSummary {
                path: PathBuf::from("/h/.Trash"),
                size_bytes: mb_to_bytes(12.0),
                count: 3,
            },
            ..Default::default()
        };

        let analysis = analyze_cleanup(&scan, None);
        assert_eq!(analysis.total_items, 3);

        let trash = analysis
            .recommendations
            .iter()
            .find(|r| r.kind == RecommendationKind::Trash)
            .unwrap();
        assert_eq!(trash.action, Action::Empty);
        assert_eq!(trash.count, Some(3));
        assert!(analysis.recommendations.iter().all(|r| r.risk == Risk::Low));
    }

    #[test]
    fn test_ml_recommendation_only_when_unused() {
        let now = Utc::now();
        let fresh = vec![entry(
            "m",
            EntryKind::MlModel {
                framework: crate::model::MlFramework::HuggingFace,
            },
            700.0,
        )
        .with_last_accessed(Some(now))];
        let report = MlCacheReport::from_entries(fresh.clone(), now);
        assert!(CategoryResult::MlCache(&report).recommendations().is_empty());

        let stale: Vec<_> = fresh
            .into_iter()
            .map(|e| e.with_last_accessed(Some(now - Duration::days(60))))
            .collect();
        let report = MlCacheReport::from_entries(stale, now);
        let recs = CategoryResult::MlCache(&report).recommendations();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::MlCache);
        assert_eq!(recs[0].size_mb, 700.0);
        assert_eq!(recs[0].action, Action::Delete);
    }

    #[test]
    fn test_recommendation_serializes_type_key() {
        let rec = CategoryResult::Trash(&TrashSummary {
            path: PathBuf::from("/t"),
            size_bytes: 1,
            count: 1,
        })
        .recommendations()
        .remove(0);
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["type"], "trash");
        assert_eq!(value["action"], "empty");
        assert_eq!(value["risk"], "low");
    }

    proptest! {
        #[test]
        fn prop_total_equals_sum_of_recommendations(
            caches in proptest::collection::vec(0u64..400_000_000, 0..6),
            logs in proptest::collection::vec(0u64..400_000_000, 0..6),
            groups in proptest::collection::vec(0u64..400_000_000, 0..6),
            trash in proptest::option::of(0u64..400_000_000),
        ) {
            let scan = ScanResults {
                caches: caches
                    .iter()
                    .enumerate()
                    .map(|(i, b)| ScanEntry::new(Path::new(&format!("/c{}", i)), EntryKind::Cache, *b))
                    .collect(),
                logs: logs
                    .iter()
                    .enumerate()
                    .map(|(i, b)| ScanEntry::new(Path::new(&format!("/l{}", i)), EntryKind::Log, *b))
                    .collect(),
                project_artifacts: groups
                    .iter()
                    .enumerate()
                    .map(|(i, b)| ArtifactGroup {
                        pattern: format!("p{}", i),
                        count: 1,
                        total_size_bytes: *b,
                        items: Vec::new(),
                    })
                    .collect(),
                trash: trash
                    .map(|b| TrashSummary { path: PathBuf::from("/t"), size_bytes: b, count: 1 })
                    .unwrap_or_default(),
                ..Default::default()
            };

            let analysis = analyze_cleanup(&scan, None);
            let sum: f64 = analysis.recommendations.iter().map(|r| r.size_mb).sum();
            prop_assert_eq!(analysis.total_reclaimable_mb, sum);
            prop_assert_eq!(analysis.total_items, analysis.recommendations.len());
            prop_assert!(analysis
                .recommendations
                .windows(2)
                .all(|w| w[0].size_mb >= w[1].size_mb));
            prop_assert!(analysis.total_reclaimable_mb >= 0.0);
        }
    }
}
