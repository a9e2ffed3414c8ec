use crate::error::{HomesweepError, Result};
use crate::platform::PathCatalog;
use crate::scan::projects::ARTIFACT_PATTERNS;
use globset::Glob;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

pub const CONFIG_ENV: &str = "HOMESWEEP_CONFIG";
const CONFIG_FILE: &str = "homesweep.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Substrings; a cache entry whose path contains any of them is skipped.
    pub exclude_paths: Vec<String>,
    pub min_size_mb: f64,
    pub check_security: bool,
    pub check_project_artifacts: bool,
    pub check_dependencies: bool,
    pub check_ml_cache: bool,
    pub projects_dir: Option<PathBuf>,
    /// Skip artifact matches nested inside another matched directory.
    pub exclusive_artifact_counting: bool,
    pub project_search_depth: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            exclude_paths: vec![
                "~/Library/Mail/".to_string(),
                "~/Library/Messages/".to_string(),
                "~/Library/Photos/".to_string(),
            ],
            min_size_mb: 10.0,
            check_security: true,
            check_project_artifacts: true,
            check_dependencies: true,
            check_ml_cache: true,
            projects_dir: None,
            exclusive_artifact_counting: false,
            project_search_depth: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub sensitive_patterns: Vec<String>,
    pub check_ssh_permissions: bool,
    pub check_file_permissions: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            sensitive_patterns: [
                "*.env",
                "*credentials*",
                "*secret*",
                "*password*",
                "*token*",
                "*api_key*",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            check_ssh_permissions: true,
            check_file_permissions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    pub safe_to_delete_patterns: Vec<String>,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            safe_to_delete_patterns: [
                "**/__pycache__",
                "**/.DS_Store",
                "**/node_modules",
                "**/*.pyc",
                "**/.pytest_cache",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanSettings,
    pub security: SecuritySettings,
    pub cleanup: CleanupSettings,
}

impl Settings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| HomesweepError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| HomesweepError::Config(format!("Failed to parse config TOML: {}", e)))
    }

    /// Load from the first configured location, or defaults when none exists.
    ///
    /// Order: `explicit`, `$HOMESWEEP_CONFIG`, `$XDG_CONFIG_HOME/homesweep/homesweep.toml`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match resolve_config_path(explicit) {
            Some(path) => path,
            None => {
                log::debug!("No configuration file found, using defaults");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            log::warn!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let settings = Self::load_from_file(&path)?;
        settings.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scan.min_size_mb.is_finite() || self.scan.min_size_mb < 0.0 {
            return Err(HomesweepError::Config(format!(
                "min_size_mb must be a non-negative number, got {}",
                self.scan.min_size_mb
            )));
        }

        if self.scan.project_search_depth == 0 {
            return Err(HomesweepError::Config(
                "project_search_depth must be at least 1".to_string(),
            ));
        }

        for pattern in self
            .security
            .sensitive_patterns
            .iter()
            .chain(self.cleanup.safe_to_delete_patterns.iter())
        {
            Glob::new(pattern)?;
        }

        Ok(())
    }

    /// Exclusion substrings with a leading `~` expanded against the catalog home.
    pub fn expanded_exclude_paths(&self, catalog: &PathCatalog) -> Vec<String> {
        self.scan
            .exclude_paths
            .iter()
            .map(|p| catalog.expand_tilde(p))
            .collect()
    }

    pub fn projects_dir(&self, catalog: &PathCatalog) -> PathBuf {
        match &self.scan.projects_dir {
            Some(dir) => PathBuf::from(catalog.expand_tilde(&dir.to_string_lossy())),
            None => catalog.default_projects_dir(),
        }
    }

    /// Safe-to-delete patterns that name something beyond the built-in artifact set.
    pub fn extra_artifact_patterns(&self) -> Vec<String> {
        let mut extra: Vec<String> = Vec::new();

        for pattern in &self.cleanup.safe_to_delete_patterns {
            let last = pattern.rsplit('/').next().unwrap_or(pattern);
            if last.is_empty() || last == "**" {
                continue;
            }
            if ARTIFACT_PATTERNS.contains(&last) || extra.iter().any(|p| p == last) {
                continue;
            }
            extra.push(last.to_string());
        }

        extra
    }
}

pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    BaseDirectories::with_prefix("homesweep")
        .ok()
        .and_then(|xdg| xdg.find_config_file(CONFIG_FILE))
}
