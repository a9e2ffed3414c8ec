//! Markdown and JSON renderings of [`AuditResults`].

use crate::error::Result;
use crate::model::{bytes_to_mb, BYTES_PER_GB};
use crate::security::{IssueCategory, SecurityReport, Severity};
use crate::snapshot::AuditResults;
use crate::util::{format_bytes, format_mb};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{self, Write};

const MAX_TABLE_ROWS: usize = 20;
const MAX_MODEL_ROWS: usize = 10;
const MAX_RECOMMENDATION_ROWS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

pub fn render(
    results: &AuditResults,
    format: ReportFormat,
    platform_label: &str,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        ReportFormat::Markdown => Ok(render_markdown(results, platform_label, generated_at)),
        ReportFormat::Json => render_json(results, platform_label, generated_at),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    platform: &'a str,
    #[serde(flatten)]
    results: &'a AuditResults,
}

pub fn render_json(
    results: &AuditResults,
    platform_label: &str,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let report = JsonReport {
        generated_at,
        platform: platform_label,
        results,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render_markdown(
    results: &AuditResults,
    platform_label: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_markdown(&mut out, results, platform_label, generated_at);
    out
}

fn write_markdown(
    out: &mut String,
    results: &AuditResults,
    platform_label: &str,
    generated_at: DateTime<Utc>,
) -> fmt::Result {
    let scan = &results.scan_results;
    let cleanup = &results.cleanup_analysis;
    let security = &results.security_results;

    writeln!(out, "# Homesweep Audit Report\n")?;
    writeln!(out, "**Platform:** {}  ", platform_label)?;
    writeln!(
        out,
        "**Generated:** {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    let total_mb = bytes_to_mb(scan.total_size_bytes());
    writeln!(out, "## Summary\n")?;
    writeln!(
        out,
        "- **Total size found:** {:.2} MB ({:.2} GB)",
        total_mb,
        total_mb / 1024.0
    )?;
    writeln!(
        out,
        "- **Reclaimable:** {:.2} GB in {} recommendations",
        cleanup.total_reclaimable_gb(),
        cleanup.total_items
    )?;
    writeln!(
        out,
        "- **Security issues:** {} ({} high)\n",
        security.total_issues, security.high_severity_issues
    )?;

    if let Some(ml) = &results.ml_cache_results {
        writeln!(out, "## ML Model Caches\n")?;
        writeln!(out, "- **Models:** {}", ml.total_models)?;
        writeln!(out, "- **Total size:** {:.2} GB", ml.total_size_gb())?;
        writeln!(out, "- **Unused models:** {}", ml.unused_models_count)?;
        writeln!(
            out,
            "- **Unused size:** {:.2} GB\n",
            ml.unused_size_bytes as f64 / BYTES_PER_GB
        )?;

        let by_type = ml.by_type();
        if !by_type.is_empty() {
            writeln!(out, "### By cache type\n")?;
            writeln!(out, "| Type | Count | Size |")?;
            writeln!(out, "|------|-------|------|")?;
            for (label, entries) in &by_type {
                let size: u64 = entries.iter().map(|e| e.size_bytes).sum();
                writeln!(out, "| {} | {} | {} |", label, entries.len(), format_bytes(size))?;
            }
            writeln!(out)?;
        }

        if !ml.models.is_empty() {
            writeln!(out, "### Largest models\n")?;
            writeln!(out, "| Model | Size | Type |")?;
            writeln!(out, "|-------|------|------|")?;
            for model in ml.models.iter().take(MAX_MODEL_ROWS) {
                writeln!(
                    out,
                    "| {} | {} | {} |",
                    model.name,
                    format_bytes(model.size_bytes),
                    model.kind.ml_cache_type().unwrap_or_default()
                )?;
            }
            writeln!(out)?;
        }

        let unused: Vec<_> = ml.unused_models().collect();
        if !unused.is_empty() {
            writeln!(out, "### Unused models\n")?;
            for model in unused {
                let last = model
                    .last_accessed
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                writeln!(
                    out,
                    "- {} ({}, last used {})",
                    model.name,
                    format_bytes(model.size_bytes),
                    last
                )?;
            }
            writeln!(out)?;
        }
    }

    if let Some(deps) = &results.dependency_results {
        writeln!(out, "## Dependency Analysis\n")?;
        writeln!(out, "- **Projects checked:** {}", deps.total_projects)?;
        writeln!(out, "- **Conflicts:** {}", deps.conflicts.len())?;
        writeln!(out, "- **Unused dependencies:** {}", deps.unused_dependencies.len())?;
        writeln!(
            out,
            "- **Outdated dependencies:** {}\n",
            deps.outdated_dependencies.len()
        )?;

        if !deps.conflicts.is_empty() {
            writeln!(out, "### Conflicts\n")?;
            writeln!(out, "| Project | Message |")?;
            writeln!(out, "|---------|---------|")?;
            for conflict in deps.conflicts.iter().take(MAX_TABLE_ROWS) {
                writeln!(out, "| `{}` | {} |", conflict.project.display(), conflict.message)?;
            }
            writeln!(out)?;
        }

        if !deps.unused_dependencies.is_empty() {
            writeln!(out, "### Unused dependencies\n")?;
            writeln!(out, "| Project | Dependency | Reason |")?;
            writeln!(out, "|---------|------------|--------|")?;
            for unused in deps.unused_dependencies.iter().take(MAX_TABLE_ROWS) {
                writeln!(
                    out,
                    "| `{}` | {} | {} |",
                    unused.project.display(),
                    unused.dependency,
                    unused.reason
                )?;
            }
            writeln!(out)?;
        }

        if !deps.outdated_dependencies.is_empty() {
            writeln!(out, "### Outdated dependencies\n")?;
            writeln!(out, "| Project | Package | Current | Latest |")?;
            writeln!(out, "|---------|---------|---------|--------|")?;
            for outdated in deps.outdated_dependencies.iter().take(MAX_TABLE_ROWS) {
                writeln!(
                    out,
                    "| `{}` | {} | {} | {} |",
                    outdated.project.display(),
                    outdated.package,
                    outdated.current,
                    outdated.latest
                )?;
            }
            writeln!(out)?;
        }
    }

    if !scan.caches.is_empty() {
        writeln!(out, "## Caches\n")?;
        writeln!(out, "| Path | Size |")?;
        writeln!(out, "|------|------|")?;
        for cache in scan.caches.iter().take(MAX_TABLE_ROWS) {
            writeln!(out, "| `{}` | {} |", cache.path.display(), format_bytes(cache.size_bytes))?;
        }
        writeln!(out)?;
    }

    if !scan.orphaned_apps.is_empty() {
        writeln!(out, "## Application Data\n")?;
        writeln!(out, "| Path | Size | Status |")?;
        writeln!(out, "|------|------|--------|")?;
        for app in scan.orphaned_apps.iter().take(MAX_TABLE_ROWS) {
            let status = if app.possibly_orphaned() {
                "Possibly orphaned"
            } else {
                "Installed"
            };
            writeln!(
                out,
                "| `{}` | {} | {} |",
                app.path.display(),
                format_bytes(app.size_bytes),
                status
            )?;
        }
        writeln!(out)?;
    }

    if !scan.hidden_files.is_empty() {
        writeln!(out, "## Large Hidden Files and Directories\n")?;
        writeln!(out, "| Path | Type | Size |")?;
        writeln!(out, "|------|------|------|")?;
        for hidden in scan.hidden_files.iter().take(MAX_TABLE_ROWS) {
            let kind = if hidden.category() == "hidden_dir" {
                "directory"
            } else {
                "file"
            };
            writeln!(
                out,
                "| `{}` | {} | {} |",
                hidden.path.display(),
                kind,
                format_bytes(hidden.size_bytes)
            )?;
        }
        writeln!(out)?;
    }

    if !scan.project_artifacts.is_empty() {
        writeln!(out, "## Project Artifacts\n")?;
        writeln!(out, "| Pattern | Count | Total size |")?;
        writeln!(out, "|---------|-------|------------|")?;
        for group in &scan.project_artifacts {
            writeln!(
                out,
                "| `{}` | {} | {} |",
                group.pattern,
                group.count,
                format_bytes(group.total_size_bytes)
            )?;
        }
        writeln!(out)?;
    }

    if !scan.logs.is_empty() {
        writeln!(out, "## Logs\n")?;
        writeln!(out, "| Path | Size |")?;
        writeln!(out, "|------|------|")?;
        for log_dir in scan.logs.iter().take(MAX_TABLE_ROWS) {
            writeln!(out, "| `{}` | {} |", log_dir.path.display(), format_bytes(log_dir.size_bytes))?;
        }
        writeln!(out)?;
    }

    if scan.trash.size_bytes > 0 || scan.trash.count > 0 {
        writeln!(out, "## Trash\n")?;
        writeln!(out, "- **Path:** `{}`", scan.trash.path.display())?;
        writeln!(out, "- **Items:** {}", scan.trash.count)?;
        writeln!(out, "- **Size:** {}\n", format_bytes(scan.trash.size_bytes))?;
    }

    out.push_str(&render_security_section(security));

    if !cleanup.recommendations.is_empty() {
        writeln!(out, "## Cleanup Recommendations\n")?;
        writeln!(
            out,
            "**Reclaimable:** {:.2} GB\n",
            cleanup.total_reclaimable_gb()
        )?;
        writeln!(out, "| Type | Target | Size | Risk | Description |")?;
        writeln!(out, "|------|--------|------|------|-------------|")?;
        for rec in cleanup.recommendations.iter().take(MAX_RECOMMENDATION_ROWS) {
            let target = rec
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| rec.name.clone());
            writeln!(
                out,
                "| {} | `{}` | {} | {} | {} |",
                rec.kind.as_str(),
                target,
                format_mb(rec.size_mb),
                rec.risk.as_str(),
                rec.description
            )?;
        }
        writeln!(out)?;
    }

    Ok(())
}

fn why_it_matters(category: IssueCategory) -> &'static str {
    match category {
        IssueCategory::SshPermissions => "Loose key permissions can expose server and account access",
        IssueCategory::FilePermissions => "Readable secrets can leak credentials",
        IssueCategory::SensitiveExposure => "Secrets shared beyond their owner can be compromised",
    }
}

/// Security issues grouped most severe first. Empty when there are none.
pub fn render_security_section(report: &SecurityReport) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_security_section(&mut out, report);
    out
}

fn write_security_section(out: &mut String, report: &SecurityReport) -> fmt::Result {
    if report.issues.is_empty() {
        return Ok(());
    }

    writeln!(out, "## Security Issues\n")?;

    for severity in Severity::descending() {
        let issues: Vec<_> = report.issues_with(severity).collect();
        if issues.is_empty() {
            continue;
        }

        let heading = match severity {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        writeln!(out, "### {}\n", heading)?;

        if severity == Severity::High {
            writeln!(out, "| Category | Path | Description | Why it matters | Recommendation |")?;
            writeln!(out, "|----------|------|-------------|----------------|----------------|")?;
        } else {
            writeln!(out, "| Category | Path | Description | Recommendation |")?;
            writeln!(out, "|----------|------|-------------|----------------|")?;
        }

        for issue in issues {
            let recommendation = issue.recommendation.as_deref().unwrap_or("N/A");
            if severity == Severity::High {
                writeln!(
                    out,
                    "| {} | `{}` | {} | {} | {} |",
                    issue.category.as_str(),
                    issue.path.display(),
                    issue.description,
                    why_it_matters(issue.category),
                    recommendation
                )?;
            } else {
                writeln!(
                    out,
                    "| {} | `{}` | {} | {} |",
                    issue.category.as_str(),
                    issue.path.display(),
                    issue.description,
                    recommendation
                )?;
            }
        }
        writeln!(out)?;
    }

    Ok(())
}
