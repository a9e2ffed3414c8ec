//! Permission and exposure checks. Issues are reported, never turned into
//! cleanup recommendations.

pub mod sensitive;
pub mod ssh;

pub use sensitive::{check_file_permissions, find_sensitive_files, SensitiveFile};
pub use ssh::{check_ssh_permissions, PRIVATE_KEY_NAMES};

use crate::config::SecuritySettings;
use crate::error::Result;
use crate::platform::PathCatalog;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Declaration order gives `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Report order, most severe first.
    pub fn descending() -> [Severity; 3] {
        [Severity::High, Severity::Medium, Severity::Low]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    SshPermissions,
    FilePermissions,
    SensitiveExposure,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::SshPermissions => "ssh_permissions",
            IssueCategory::FilePermissions => "file_permissions",
            IssueCategory::SensitiveExposure => "sensitive_exposure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub path: PathBuf,
    pub description: String,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub issues: Vec<SecurityIssue>,
    pub sensitive_files: Vec<SensitiveFile>,
    pub total_issues: usize,
    pub high_severity_issues: usize,
}

impl SecurityReport {
    pub fn new(issues: Vec<SecurityIssue>, sensitive_files: Vec<SensitiveFile>) -> Self {
        let high_severity_issues = issues
            .iter()
            .filter(|i| i.severity == Severity::High)
            .count();

        Self {
            total_issues: issues.len(),
            high_severity_issues,
            issues,
            sensitive_files,
        }
    }

    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &SecurityIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }
}

/// Run the SSH check and the sensitive-file search enabled in `settings`.
pub fn scan_security(catalog: &PathCatalog, settings: &SecuritySettings) -> Result<SecurityReport> {
    let mut issues = Vec::new();
    let mut sensitive_files = Vec::new();

    if settings.check_ssh_permissions {
        issues.extend(check_ssh_permissions(&catalog.ssh_dir()));
    }

    if !settings.sensitive_patterns.is_empty() {
        sensitive_files =
            find_sensitive_files(&catalog.sensitive_search_roots(), &settings.sensitive_patterns)?;

        if settings.check_file_permissions {
            issues.extend(
                sensitive_files
                    .iter()
                    .filter_map(|f| check_file_permissions(&f.path)),
            );
        }
    }

    let report = SecurityReport::new(issues, sensitive_files);
    log::info!(
        "Security scan: {} issues ({} high), {} sensitive files",
        report.total_issues,
        report.high_severity_issues,
        report.sensitive_files.len()
    );
    Ok(report)
}

/// `ls -l` style rendering of a mode, e.g. `drwx------`.
pub fn format_mode(mode: u32, is_dir: bool) -> String {
    let mut out = String::with_capacity(10);
    out.push(if is_dir { 'd' } else { '-' });

    let triplets = [(6, 0o4000, 's'), (3, 0o2000, 's'), (0, 0o1000, 't')];
    for (shift, special, special_char) in triplets {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        let exec = bits & 0o1 != 0;
        out.push(match (mode & special != 0, exec) {
            (true, true) => special_char,
            (true, false) => special_char.to_ascii_uppercase(),
            (false, true) => 'x',
            (false, false) => '-',
        });
    }

    out
}
