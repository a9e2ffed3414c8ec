use super::{format_mode, IssueCategory, SecurityIssue, Severity};
use crate::error::Result;
use crate::platform::non_overlapping_roots;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name endings that mark a file as holding secrets.
pub const SENSITIVE_EXTENSIONS: &[&str] = &[".env", ".key", ".pem", ".p12", ".pfx"];

/// Name fragments that mark a file as holding secrets.
pub const SENSITIVE_KEYWORDS: &[&str] = &["secret", "password", "credential", "token", "api_key"];

/// A file matched by name against the sensitive patterns. Contents are never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveFile {
    pub path: PathBuf,
    pub pattern: String,
    pub size_bytes: u64,
}

fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Recursively match file names under each root against `patterns`.
///
/// Nested roots are collapsed first and each path is reported once, tagged
/// with the first pattern it matched.
pub fn find_sensitive_files(roots: &[PathBuf], patterns: &[String]) -> Result<Vec<SensitiveFile>> {
    let matcher = build_matcher(patterns)?;
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for root in non_overlapping_roots(roots.to_vec()) {
        if !root.is_dir() {
            log::debug!("Sensitive search root not found: {}", root.display());
            continue;
        }

        for entry in WalkDir::new(&root).follow_links(false).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Walk error during sensitive file search: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let hits = matcher.matches(entry.file_name());
            let first = match hits.first() {
                Some(index) => *index,
                None => continue,
            };

            let size_bytes = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => {
                    log::debug!("Cannot stat {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            if seen.insert(entry.path().to_path_buf()) {
                found.push(SensitiveFile {
                    path: entry.into_path(),
                    pattern: patterns[first].clone(),
                    size_bytes,
                });
            }
        }
    }

    Ok(found)
}

/// Whether the file name alone marks it as a secret.
pub fn is_sensitive_name(path: &Path) -> bool {
    let name = match path.file_name() {
        Some(n) => n.to_string_lossy().to_lowercase(),
        None => return false,
    };

    SENSITIVE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        || SENSITIVE_KEYWORDS.iter().any(|kw| name.contains(kw))
}

/// Exposure check for one sensitive candidate.
///
/// World-readable with a sensitive name is high. Group-readable only, with a
/// sensitive name, is medium. Anything else, including a world-readable file
/// with an innocuous name, is fine.
#[cfg(unix)]
pub fn check_file_permissions(path: &Path) -> Option<SecurityIssue> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).ok()?;
    let mode = metadata.permissions().mode() & 0o7777;
    let world_readable = mode & 0o004 != 0;
    let group_readable = mode & 0o040 != 0;

    if !(world_readable || group_readable) || !is_sensitive_name(path) {
        return None;
    }

    let rendered = format_mode(mode, metadata.is_dir());
    let recommendation = Some(format!("Run: chmod 600 {}", path.display()));

    if world_readable {
        Some(SecurityIssue {
            severity: Severity::High,
            category: IssueCategory::FilePermissions,
            path: path.to_path_buf(),
            description: format!("Secret file is readable by everyone: {}", rendered),
            recommendation,
        })
    } else {
        Some(SecurityIssue {
            severity: Severity::Medium,
            category: IssueCategory::SensitiveExposure,
            path: path.to_path_buf(),
            description: format!("Secret file is readable by its group: {}", rendered),
            recommendation,
        })
    }
}

#[cfg(not(unix))]
pub fn check_file_permissions(_path: &Path) -> Option<SecurityIssue> {
    None
}
