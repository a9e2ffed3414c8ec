pub mod audit;
pub mod cleanup;
pub mod config;
pub mod deps;
pub mod error;
pub mod model;
pub mod platform;
pub mod report;
pub mod scan;
pub mod security;
pub mod snapshot;
pub mod util;
pub mod walk;

pub use audit::{plan_worker_groups, AuditRequest, Auditor, ScanTask, TaskOutput};
pub use cleanup::{
    analyze_cleanup, rank, Action, CategoryResult, CleanupAnalysis, CleanupRecommendation,
    RecommendationKind, Risk,
};
pub use config::{CleanupSettings, ScanSettings, SecuritySettings, Settings};
pub use deps::{analyze_dependencies, DependencyReport};
pub use error::{HomesweepError, Result};
pub use model::{ArtifactGroup, EntryKind, MlFramework, ScanEntry, ScanResults, TrashSummary};
pub use platform::{
    get_disk_space, AppInventory, DiskSpace, PathCatalog, Platform, StaticInventory,
    SystemInventory,
};
pub use report::{render, render_json, render_markdown, ReportFormat};
pub use scan::MlCacheReport;
pub use security::{scan_security, IssueCategory, SecurityIssue, SecurityReport, Severity};
pub use snapshot::{load_snapshot, save_snapshot, AuditResults};
pub use walk::{measure, size_of, walk_sizes, SizeReport};
