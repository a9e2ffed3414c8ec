//! Runs the selected scanners and folds their outputs into [`AuditResults`].
//!
//! Tasks whose filesystem roots overlap are placed in the same worker group and
//! run one after another, so each subtree is walked by a single worker. Groups
//! run in parallel.

use crate::cleanup::analyze_cleanup;
use crate::config::Settings;
use crate::deps::{analyze_dependencies, DependencyReport, UV_TIMEOUT};
use crate::error::Result;
use crate::model::{ArtifactGroup, ScanEntry, TrashSummary};
use crate::platform::{AppInventory, PathCatalog};
use crate::scan::{
    scan_app_support, scan_caches, scan_hidden, scan_logs, scan_ml_caches,
    scan_project_artifacts, scan_trash, MlCacheReport,
};
use crate::security::{scan_security, SecurityReport};
use crate::snapshot::AuditResults;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScanTask {
    Caches,
    OrphanedApps,
    Hidden,
    ProjectArtifacts,
    Trash,
    Logs,
    Security,
    MlCache,
    Dependencies,
}

impl ScanTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanTask::Caches => "caches",
            ScanTask::OrphanedApps => "orphaned_apps",
            ScanTask::Hidden => "hidden_files",
            ScanTask::ProjectArtifacts => "project_artifacts",
            ScanTask::Trash => "trash",
            ScanTask::Logs => "logs",
            ScanTask::Security => "security",
            ScanTask::MlCache => "ml_cache",
            ScanTask::Dependencies => "dependencies",
        }
    }

    /// Directories this task walks recursively.
    pub fn roots(&self, catalog: &PathCatalog, settings: &Settings) -> Vec<PathBuf> {
        match self {
            ScanTask::Caches => vec![catalog.cache_root()],
            ScanTask::OrphanedApps => vec![catalog.app_support_root()],
            ScanTask::Hidden => vec![catalog.home().to_path_buf()],
            ScanTask::ProjectArtifacts | ScanTask::Dependencies => {
                vec![settings.projects_dir(catalog)]
            }
            ScanTask::Trash => vec![catalog.trash_root()],
            ScanTask::Logs => vec![catalog.logs_root()],
            ScanTask::Security => {
                let mut roots = vec![catalog.ssh_dir()];
                if !settings.security.sensitive_patterns.is_empty() {
                    roots.extend(catalog.sensitive_search_roots());
                }
                roots
            }
            ScanTask::MlCache => catalog.ml_cache_roots(),
        }
    }
}

/// Output of one task, tagged by the slot it fills in the results.
#[derive(Debug)]
pub enum TaskOutput {
    Caches(Vec<ScanEntry>),
    OrphanedApps(Vec<ScanEntry>),
    Hidden(Vec<ScanEntry>),
    ProjectArtifacts(Vec<ArtifactGroup>),
    Trash(TrashSummary),
    Logs(Vec<ScanEntry>),
    Security(SecurityReport),
    MlCache(Vec<ScanEntry>),
    Dependencies(DependencyReport),
}

/// Which categories a scan covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditRequest {
    pub all: bool,
    pub caches: bool,
    pub security: bool,
    pub projects: bool,
    pub dependencies: bool,
    pub ml_cache: bool,
}

impl AuditRequest {
    pub fn all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }

    /// Tasks selected by this request under `settings`.
    ///
    /// `caches` covers caches, application data, logs and trash. Hidden files
    /// are only scanned with `all`. The ML cache and dependency passes also
    /// run when enabled in settings.
    pub fn tasks(&self, settings: &Settings) -> Vec<ScanTask> {
        let scan = &settings.scan;
        let mut tasks = Vec::new();

        if self.all || self.caches {
            tasks.extend([
                ScanTask::Caches,
                ScanTask::OrphanedApps,
                ScanTask::Logs,
                ScanTask::Trash,
            ]);
        }
        if self.all {
            tasks.push(ScanTask::Hidden);
        }
        if (self.all || self.projects) && scan.check_project_artifacts {
            tasks.push(ScanTask::ProjectArtifacts);
        }
        if (self.all || self.security) && scan.check_security {
            tasks.push(ScanTask::Security);
        }
        if self.all || self.ml_cache || scan.check_ml_cache {
            tasks.push(ScanTask::MlCache);
        }
        if self.all || self.dependencies || scan.check_dependencies {
            tasks.push(ScanTask::Dependencies);
        }

        tasks.sort();
        tasks
    }
}

fn overlaps(a: &[PathBuf], b: &[PathBuf]) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.starts_with(y) || y.starts_with(x)))
}

/// Partition tasks into worker groups with pairwise disjoint roots.
///
/// Overlap is transitive: a task touching two existing groups merges them.
/// Tasks keep their relative order inside a group.
pub fn plan_worker_groups(tasks: Vec<(ScanTask, Vec<PathBuf>)>) -> Vec<Vec<ScanTask>> {
    let mut groups: Vec<(Vec<PathBuf>, Vec<ScanTask>)> = Vec::new();

    for (task, roots) in tasks {
        let (overlapping, mut rest): (Vec<_>, Vec<_>) = groups
            .into_iter()
            .partition(|(group_roots, _)| overlaps(group_roots, &roots));

        let mut merged_roots = roots;
        let mut merged_tasks = Vec::new();
        for (group_roots, group_tasks) in overlapping {
            merged_roots.extend(group_roots);
            merged_tasks.extend(group_tasks);
        }
        merged_tasks.push(task);
        merged_tasks.sort();

        rest.push((merged_roots, merged_tasks));
        groups = rest;
    }

    groups.into_iter().map(|(_, tasks)| tasks).collect()
}

pub struct Auditor<'a> {
    catalog: PathCatalog,
    settings: Settings,
    inventory: &'a dyn AppInventory,
    now: DateTime<Utc>,
}

impl<'a> Auditor<'a> {
    pub fn new(catalog: PathCatalog, settings: Settings, inventory: &'a dyn AppInventory) -> Self {
        Self {
            catalog,
            settings,
            inventory,
            now: Utc::now(),
        }
    }

    /// Reference instant for ML cache staleness.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn catalog(&self) -> &PathCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run(&self, request: &AuditRequest) -> Result<AuditResults> {
        self.catalog.check_home()?;

        let tasks = request.tasks(&self.settings);
        let planned: Vec<(ScanTask, Vec<PathBuf>)> = tasks
            .iter()
            .map(|task| (*task, task.roots(&self.catalog, &self.settings)))
            .collect();
        let groups = plan_worker_groups(planned);

        log::info!(
            "Running {} scan tasks in {} worker groups",
            tasks.len(),
            groups.len()
        );

        let outputs: Vec<Vec<TaskOutput>> = groups
            .par_iter()
            .map(|group| {
                group
                    .iter()
                    .map(|task| self.run_task(*task))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.fold(outputs.into_iter().flatten()))
    }

    pub fn run_task(&self, task: ScanTask) -> Result<TaskOutput> {
        log::debug!("Starting task {}", task.as_str());
        let scan = &self.settings.scan;

        let output = match task {
            ScanTask::Caches => TaskOutput::Caches(scan_caches(
                &self.catalog,
                &self.settings.expanded_exclude_paths(&self.catalog),
            )),
            ScanTask::OrphanedApps => {
                let installed = self.inventory.installed_apps();
                TaskOutput::OrphanedApps(scan_app_support(&self.catalog, &installed))
            }
            ScanTask::Hidden => TaskOutput::Hidden(scan_hidden(&self.catalog, scan.min_size_mb)),
            ScanTask::ProjectArtifacts => TaskOutput::ProjectArtifacts(scan_project_artifacts(
                &self.settings.projects_dir(&self.catalog),
                &self.settings.extra_artifact_patterns(),
                scan.exclusive_artifact_counting,
            )?),
            ScanTask::Trash => TaskOutput::Trash(scan_trash(&self.catalog)),
            ScanTask::Logs => TaskOutput::Logs(scan_logs(&self.catalog)),
            ScanTask::Security => {
                TaskOutput::Security(scan_security(&self.catalog, &self.settings.security)?)
            }
            ScanTask::MlCache => TaskOutput::MlCache(scan_ml_caches(&self.catalog)),
            ScanTask::Dependencies => TaskOutput::Dependencies(analyze_dependencies(
                &self.settings.projects_dir(&self.catalog),
                scan.project_search_depth,
                UV_TIMEOUT,
            )),
        };

        log::debug!("Finished task {}", task.as_str());
        Ok(output)
    }

    fn fold(&self, outputs: impl Iterator<Item = TaskOutput>) -> AuditResults {
        let mut results = AuditResults::default();
        results.scan_results.trash = TrashSummary::empty(&self.catalog.trash_root());

        for output in outputs {
            match output {
                TaskOutput::Caches(entries) => results.scan_results.caches = entries,
                TaskOutput::OrphanedApps(entries) => results.scan_results.orphaned_apps = entries,
                TaskOutput::Hidden(entries) => results.scan_results.hidden_files = entries,
                TaskOutput::ProjectArtifacts(groups) => {
                    results.scan_results.project_artifacts = groups
                }
                TaskOutput::Trash(trash) => results.scan_results.trash = trash,
                TaskOutput::Logs(entries) => results.scan_results.logs = entries,
                TaskOutput::Security(report) => results.security_results = report,
                TaskOutput::MlCache(entries) => {
                    results.ml_cache_results = Some(MlCacheReport::from_entries(entries, self.now))
                }
                TaskOutput::Dependencies(report) => results.dependency_results = Some(report),
            }
        }

        results.cleanup_analysis =
            analyze_cleanup(&results.scan_results, results.ml_cache_results.as_ref());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HomesweepError;
    use crate::platform::{Platform, StaticInventory};
    use std::fs;
    use tempfile::TempDir;

    fn quiet_settings() -> Settings {
        let mut settings = Settings::default();
        settings.scan.check_ml_cache = false;
        settings.scan.check_dependencies = false;
        settings
    }

    #[test]
    fn test_request_selection() {
        let settings = quiet_settings();

        let caches = AuditRequest {
            caches: true,
            ..Default::default()
        };
        assert_eq!(
            caches.tasks(&settings),
            vec![
                ScanTask::Caches,
                ScanTask::OrphanedApps,
                ScanTask::Trash,
                ScanTask::Logs
            ]
        );

        let all = AuditRequest::all().tasks(&settings);
        assert!(all.contains(&ScanTask::Hidden));
        assert!(all.contains(&ScanTask::MlCache));
        assert!(all.contains(&ScanTask::Dependencies));

        assert!(AuditRequest::default().tasks(&settings).is_empty());
    }

    #[test]
    fn test_settings_toggles() {
        let mut settings = Settings::default();
        let none = AuditRequest::default().tasks(&settings);
        assert_eq!(none, vec![ScanTask::MlCache, ScanTask::Dependencies]);

        settings.scan.check_security = false;
        settings.scan.check_project_artifacts = false;
        let all = AuditRequest::all().tasks(&settings);
        assert!(!all.contains(&ScanTask::Security));
        assert!(!all.contains(&ScanTask::ProjectArtifacts));
    }

    #[test]
    fn test_worker_groups_are_disjoint() {
        let p = |s: &str| PathBuf::from(s);
        let groups = plan_worker_groups(vec![
            (ScanTask::Caches, vec![p("/h/.cache")]),
            (ScanTask::Trash, vec![p("/h/.Trash")]),
            (ScanTask::MlCache, vec![p("/h/.cache/torch"), p("/h/.keras")]),
            (ScanTask::ProjectArtifacts, vec![p("/h/development")]),
            (ScanTask::Dependencies, vec![p("/h/development")]),
        ]);

        assert_eq!(groups.len(), 3);
        assert!(groups.contains(&vec![ScanTask::Caches, ScanTask::MlCache]));
        assert!(groups.contains(&vec![ScanTask::Trash]));
        assert!(groups.contains(&vec![
            ScanTask::ProjectArtifacts,
            ScanTask::Dependencies
        ]));
    }

    #[test]
    fn test_worker_groups_merge_transitively() {
        let p = |s: &str| PathBuf::from(s);
        let groups = plan_worker_groups(vec![
            (ScanTask::Caches, vec![p("/h/.cache")]),
            (ScanTask::Logs, vec![p("/h/.local/state")]),
            (ScanTask::Security, vec![p("/h/.ssh"), p("/h")]),
            (ScanTask::MlCache, Vec::new()),
        ]);

        assert_eq!(groups.len(), 2);
        assert!(groups.contains(&vec![ScanTask::Caches, ScanTask::Logs, ScanTask::Security]));
        assert!(groups.contains(&vec![ScanTask::MlCache]));
    }

    #[test]
    fn test_missing_home_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = PathCatalog::new(temp_dir.path().join("gone"), Platform::Linux);
        let inventory = StaticInventory::default();
        let auditor = Auditor::new(catalog, quiet_settings(), &inventory);

        let err = auditor.run(&AuditRequest::all()).unwrap_err();
        assert!(matches!(err, HomesweepError::HomeNotFound(_)));
    }

    #[test]
    fn test_run_caches_only() {
        let home = TempDir::new().unwrap();
        let write = |rel: &str, len: u64| {
            let path = home.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::File::create(&path).unwrap().set_len(len).unwrap();
        };
        write(".cache/big-tool/blob", 60 * 1024 * 1024);
        write(".local/share/Trash/files/old.txt", 4096);

        let catalog = PathCatalog::new(home.path(), Platform::Linux);
        let inventory = StaticInventory::default();
        let auditor = Auditor::new(catalog, quiet_settings(), &inventory);

        let results = auditor
            .run(&AuditRequest {
                caches: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(results.scan_results.caches.len(), 1);
        assert_eq!(results.scan_results.caches[0].name, "big-tool");
        assert_eq!(results.scan_results.trash.count, 1);
        assert!(results.ml_cache_results.is_none());
        assert!(results.dependency_results.is_none());
        assert_eq!(results.security_results.total_issues, 0);
        assert_eq!(results.cleanup_analysis.total_items, 2);
    }

    #[test]
    fn test_trash_slot_defaults_to_catalog_path() {
        let home = TempDir::new().unwrap();
        let catalog = PathCatalog::new(home.path(), Platform::MacOs);
        let inventory = StaticInventory::default();
        let auditor = Auditor::new(catalog, quiet_settings(), &inventory);

        let results = auditor.run(&AuditRequest::default()).unwrap();
        assert_eq!(results.scan_results.trash.path, home.path().join(".Trash"));
        assert_eq!(results.scan_results.trash.size_bytes, 0);
        assert!(results.cleanup_analysis.recommendations.is_empty());
    }
}
