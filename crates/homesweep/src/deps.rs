//! Python dependency hygiene for projects under the projects directory.
//!
//! Conflicts and outdated packages come from `uv`; a missing `uv` leaves those
//! lists empty. Unused dependencies are found by comparing `[project]`
//! dependencies in `pyproject.toml` with the modules imported by the code.

use crate::platform::{find_project_roots, run_with_timeout};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

pub const UV_TIMEOUT: Duration = Duration::from_secs(30);

const SKIPPED_DIRS: &[&str] = &["venv", "node_modules", "__pycache__"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConflict {
    pub project: PathBuf,
    pub message: String,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedDependency {
    pub project: PathBuf,
    pub dependency: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedDependency {
    pub project: PathBuf,
    pub package: String,
    pub current: String,
    pub latest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub total_projects: usize,
    pub conflicts: Vec<DependencyConflict>,
    pub unused_dependencies: Vec<UnusedDependency>,
    pub outdated_dependencies: Vec<OutdatedDependency>,
}

pub fn is_python_project(path: &Path) -> bool {
    path.join("pyproject.toml").exists() || path.join("requirements.txt").exists()
}

/// Conflict lines from `uv pip check` output.
pub fn parse_conflicts(project: &Path, output: &str) -> Vec<DependencyConflict> {
    output
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains("has requirement") || lower.contains("conflicts")
        })
        .map(|line| DependencyConflict {
            project: project.to_path_buf(),
            message: line.trim().to_string(),
            severity: "warning".to_string(),
        })
        .collect()
}

/// Rows of the `uv pip list --outdated` table, after its two header lines.
pub fn parse_outdated(project: &Path, output: &str) -> Vec<OutdatedDependency> {
    output
        .lines()
        .skip(2)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            Some(OutdatedDependency {
                project: project.to_path_buf(),
                package: parts[0].to_string(),
                current: parts[1].to_string(),
                latest: parts[2].to_string(),
            })
        })
        .collect()
}

pub fn check_conflicts(project: &Path, timeout: Duration) -> Vec<DependencyConflict> {
    if !is_python_project(project) {
        return Vec::new();
    }

    match run_with_timeout("uv", &["pip", "check"], Some(project), timeout) {
        // uv exits non-zero exactly when it found problems
        Ok(output) if !output.success && !output.stdout.is_empty() => {
            parse_conflicts(project, &output.stdout)
        }
        Ok(_) => Vec::new(),
        Err(e) => {
            log::debug!("Cannot check dependency conflicts in {}: {}", project.display(), e);
            Vec::new()
        }
    }
}

pub fn check_outdated(project: &Path, timeout: Duration) -> Vec<OutdatedDependency> {
    match run_with_timeout("uv", &["pip", "list", "--outdated"], Some(project), timeout) {
        Ok(output) if output.success => parse_outdated(project, &output.stdout),
        Ok(_) => Vec::new(),
        Err(e) => {
            log::debug!("Cannot check outdated dependencies in {}: {}", project.display(), e);
            Vec::new()
        }
    }
}

/// Split a PEP 508 requirement into its declared name and the form used for
/// import matching (`Foo-Bar[x]>=1; python_version<'3.12'` gives `Foo-Bar`, `foo_bar`).
pub fn normalize_requirement(requirement: &str) -> Option<(String, String)> {
    let end = requirement
        .find(|c: char| matches!(c, '<' | '>' | '=' | '!' | '~' | ';' | '[' | '@' | '(') || c.is_whitespace())
        .unwrap_or(requirement.len());
    let name = requirement[..end].trim();

    if name.is_empty() {
        return None;
    }

    Some((name.to_string(), name.replace('-', "_").to_lowercase()))
}

fn module_names(line: &str) -> Vec<String> {
    let line = line.trim();

    let targets: Vec<&str> = if let Some(rest) = line.strip_prefix("from ") {
        rest.split_whitespace().next().into_iter().collect()
    } else if let Some(rest) = line.strip_prefix("import ") {
        rest.split(',')
            .filter_map(|part| part.split_whitespace().next())
            .collect()
    } else {
        Vec::new()
    };

    targets
        .into_iter()
        .filter_map(|t| t.split('.').next())
        .filter(|m| !m.is_empty())
        .map(|m| m.to_lowercase())
        .collect()
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Top-level module names imported by `*.py` files in the project, or `None`
/// when the project has no Python sources.
pub fn collect_imports(project: &Path) -> Option<HashSet<String>> {
    let mut imports = HashSet::new();
    let mut saw_python = false;

    let walker = WalkDir::new(project)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file()
            || entry.path().extension().map(|e| e != "py").unwrap_or(true)
        {
            continue;
        }
        saw_python = true;

        let content = match fs::read_to_string(entry.path()) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("Cannot read {}: {}", entry.path().display(), e);
                continue;
            }
        };

        for line in content.lines() {
            imports.extend(module_names(line));
        }
    }

    saw_python.then_some(imports)
}

fn declared_dependencies(pyproject: &Path) -> Vec<String> {
    let contents = match fs::read_to_string(pyproject) {
        Ok(c) => c,
        Err(e) => {
            log::debug!("Cannot read {}: {}", pyproject.display(), e);
            return Vec::new();
        }
    };

    let value: toml::Value = match toml::from_str(&contents) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Cannot parse {}: {}", pyproject.display(), e);
            return Vec::new();
        }
    };

    value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|deps| {
            deps.iter()
                .filter_map(|d| d.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Dependencies declared in `pyproject.toml` that no import appears to use.
pub fn find_unused_dependencies(project: &Path) -> Vec<UnusedDependency> {
    let pyproject = project.join("pyproject.toml");
    if !pyproject.exists() {
        return Vec::new();
    }

    let dependencies = declared_dependencies(&pyproject);
    if dependencies.is_empty() {
        return Vec::new();
    }

    let imports = match collect_imports(project) {
        Some(imports) => imports,
        None => return Vec::new(),
    };

    dependencies
        .iter()
        .filter_map(|dep| normalize_requirement(dep))
        .filter(|(_, normalized)| {
            !imports
                .iter()
                .any(|imp| imp == normalized || imp.starts_with(normalized.as_str()))
        })
        .map(|(name, _)| UnusedDependency {
            project: project.to_path_buf(),
            dependency: name,
            reason: "No usage found in code".to_string(),
        })
        .collect()
}

/// Analyze every Python project found under `projects_dir`.
pub fn analyze_dependencies(projects_dir: &Path, max_depth: usize, timeout: Duration) -> DependencyReport {
    if !projects_dir.is_dir() {
        log::warn!("Projects directory not found: {}", projects_dir.display());
        return DependencyReport::default();
    }

    let projects: Vec<PathBuf> = find_project_roots(&[projects_dir.to_path_buf()], max_depth)
        .into_iter()
        .filter(|p| is_python_project(p))
        .collect();

    log::info!("Found {} Python projects", projects.len());

    let mut report = DependencyReport {
        total_projects: projects.len(),
        ..Default::default()
    };

    for project in &projects {
        report.conflicts.extend(check_conflicts(project, timeout));
        report.unused_dependencies.extend(find_unused_dependencies(project));
        report.outdated_dependencies.extend(check_outdated(project, timeout));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_requirement() {
        assert_eq!(
            normalize_requirement("Foo-Bar[extra]>=1.0; python_version<'3.12'"),
            Some(("Foo-Bar".to_string(), "foo_bar".to_string()))
        );
        assert_eq!(
            normalize_requirement("requests==2.31.0"),
            Some(("requests".to_string(), "requests".to_string()))
        );
        assert_eq!(
            normalize_requirement("pkg @ https://example.com/pkg.whl").map(|n| n.1),
            Some("pkg".to_string())
        );
        assert_eq!(normalize_requirement("  "), None);
    }

    #[test]
    fn test_module_names() {
        assert_eq!(module_names("import os.path"), vec!["os"]);
        assert_eq!(module_names("  from Numpy.linalg import norm"), vec!["numpy"]);
        assert_eq!(module_names("import a, b.c as d"), vec!["a", "b"]);
        assert!(module_names("from . import sibling").is_empty());
        assert!(module_names("x = 'import nothing'").is_empty());
    }

    #[test]
    fn test_parse_conflicts() {
        let output = "Checked 12 packages\n\
                      The package `foo` has requirement `bar>=2`, but `bar==1.0` is installed\n\
                      baz 1.0 conflicts with qux 2.0\n";
        let conflicts = parse_conflicts(Path::new("/p"), output);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].severity, "warning");
        assert!(conflicts[1].message.starts_with("baz"));
    }

    #[test]
    fn test_parse_outdated_skips_header() {
        let output = "Package Version Latest Type\n\
                      ------- ------- ------ -----\n\
                      requests 2.28.0 2.31.0 wheel\n\
                      short 1.0\n";
        let outdated = parse_outdated(Path::new("/p"), output);
        assert_eq!(outdated.len(), 1);
        assert_eq!(outdated[0].package, "requests");
        assert_eq!(outdated[0].latest, "2.31.0");
    }

    #[test]
    fn test_find_unused_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path();
        fs::write(
            project.join("pyproject.toml"),
            r#"
            [project]
            name = "demo"
            dependencies = ["requests>=2", "PyYAML", "typing-extensions", "scikit-learn"]
            "#,
        )
        .unwrap();
        fs::create_dir_all(project.join("src/demo")).unwrap();
        fs::write(
            project.join("src/demo/app.py"),
            "import requests\nfrom typing_extensions import Self\n",
        )
        .unwrap();
        fs::create_dir_all(project.join(".venv/lib")).unwrap();
        fs::write(project.join(".venv/lib/site.py"), "import yaml\nimport scikit_learn\n").unwrap();

        let unused: Vec<String> = find_unused_dependencies(project)
            .into_iter()
            .map(|u| u.dependency)
            .collect();
        assert_eq!(unused, vec!["PyYAML".to_string(), "scikit-learn".to_string()]);
    }

    #[test]
    fn test_no_python_sources_reports_nothing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("pyproject.toml"),
            "[project]\ndependencies = [\"requests\"]\n",
        )
        .unwrap();
        assert!(find_unused_dependencies(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_analyze_counts_python_projects_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::write(root.join("api/requirements.txt"), "flask\n").unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("web/package.json"), "{}").unwrap();

        let report = analyze_dependencies(root, 3, Duration::from_secs(5));
        assert_eq!(report.total_projects, 1);
        assert!(report.unused_dependencies.is_empty());
    }
}
