//! Well-known directory layout for a home directory on a given platform.
//!
//! Resolution is pure: the same `(home, platform)` always yields the same paths.
//! Existence checks happen at call time and are never cached.

use super::Platform;
use crate::error::{HomesweepError, Result};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Entries whose presence marks a directory as a project root.
pub const PROJECT_MARKERS: &[&str] = &[
    ".git",             // Git
    ".hg",              // Mercurial
    ".svn",             // Subversion
    ".jj",              // Jujutsu
    "Cargo.toml",       // Rust
    "pyproject.toml",   // Python
    "requirements.txt", // Python
    "setup.py",         // Python
    "package.json",     // JavaScript/Node
    "go.mod",           // Go
    "pom.xml",          // Java (Maven)
    "build.gradle",     // Java/Kotlin (Gradle)
    "Gemfile",          // Ruby
    "composer.json",    // PHP
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCatalog {
    home: PathBuf,
    platform: Platform,
}

impl PathCatalog {
    pub fn new(home: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            home: home.into(),
            platform,
        }
    }

    /// Catalog for the current user's `$HOME`.
    pub fn from_env(platform: Platform) -> Result<Self> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| HomesweepError::HomeNotFound(PathBuf::from("$HOME")))?;
        Ok(Self::new(home, platform))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Fails when the home directory is missing or cannot be listed.
    pub fn check_home(&self) -> Result<()> {
        match fs::read_dir(&self.home) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("Home directory {} is not traversable: {}", self.home.display(), e);
                Err(HomesweepError::HomeNotFound(self.home.clone()))
            }
        }
    }

    pub fn cache_root(&self) -> PathBuf {
        match self.platform {
            Platform::MacOs => self.home.join("Library").join("Caches"),
            Platform::Linux | Platform::Unknown => self.home.join(".cache"),
        }
    }

    pub fn app_support_root(&self) -> PathBuf {
        match self.platform {
            Platform::MacOs => self.home.join("Library").join("Application Support"),
            Platform::Linux | Platform::Unknown => self.home.join(".local").join("share"),
        }
    }

    pub fn logs_root(&self) -> PathBuf {
        match self.platform {
            Platform::MacOs => self.home.join("Library").join("Logs"),
            Platform::Linux | Platform::Unknown => {
                self.home.join(".local").join("share").join("logs")
            }
        }
    }

    /// On Linux the freedesktop trash wins when it exists, otherwise `~/.Trash`.
    pub fn trash_root(&self) -> PathBuf {
        match self.platform {
            Platform::MacOs => self.home.join(".Trash"),
            Platform::Linux | Platform::Unknown => {
                let freedesktop = self.home.join(".local").join("share").join("Trash");
                if freedesktop.exists() {
                    freedesktop
                } else {
                    self.home.join(".Trash")
                }
            }
        }
    }

    pub fn ssh_dir(&self) -> PathBuf {
        self.home.join(".ssh")
    }

    pub fn config_roots(&self) -> Vec<PathBuf> {
        match self.platform {
            Platform::MacOs => vec![self.home.join("Library").join("Preferences")],
            Platform::Linux | Platform::Unknown => vec![self.home.join(".config")],
        }
    }

    /// System application bundle directory, macOS only.
    pub fn applications_dir(&self) -> Option<PathBuf> {
        match self.platform {
            Platform::MacOs => Some(PathBuf::from("/Applications")),
            Platform::Linux | Platform::Unknown => None,
        }
    }

    /// Existing ML framework caches: Hugging Face hub, PyTorch checkpoints,
    /// TensorFlow/Keras saved models.
    pub fn ml_cache_roots(&self) -> Vec<PathBuf> {
        let cache = self.cache_root();
        let candidates = [
            cache.join("huggingface"),
            cache.join("torch"),
            cache.join("tensorflow"),
            self.home.join(".keras"),
        ];

        let mut roots = Vec::new();
        for candidate in candidates {
            if candidate.is_dir() && !roots.contains(&candidate) {
                roots.push(candidate);
            }
        }
        roots
    }

    pub fn default_projects_dir(&self) -> PathBuf {
        self.home.join("development")
    }

    /// Roots searched for sensitive files.
    pub fn sensitive_search_roots(&self) -> Vec<PathBuf> {
        vec![
            self.home.clone(),
            self.home.join("development"),
            self.home.join("Documents"),
        ]
    }

    /// Expand a leading `~` against this catalog's home.
    pub fn expand_tilde(&self, value: &str) -> String {
        if value == "~" {
            self.home.to_string_lossy().to_string()
        } else if let Some(rest) = value.strip_prefix("~/") {
            self.home.join(rest).to_string_lossy().to_string()
        } else {
            value.to_string()
        }
    }
}

pub fn is_project_root(path: &Path) -> bool {
    PROJECT_MARKERS
        .iter()
        .any(|marker| path.join(marker).exists())
}

/// Drop roots nested inside another root so each subtree is walked once.
/// Keeps the first-seen order of the survivors.
pub fn non_overlapping_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for root in roots {
        if result.iter().any(|kept| root.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(&root));
        result.push(root);
    }

    result
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Find project roots under each search root, at most `max_depth` levels down.
///
/// A directory holding a project marker is reported and not descended into.
/// Hidden directories are skipped. Results are de-duplicated by absolute path
/// and keep discovery order.
pub fn find_project_roots(search_roots: &[PathBuf], max_depth: usize) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut roots = Vec::new();

    for search_root in search_roots {
        if !search_root.is_dir() {
            log::debug!("Project search root not found: {}", search_root.display());
            continue;
        }

        let mut walker = WalkDir::new(search_root)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Walk error during project search: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.depth() > 0 && is_hidden(entry.file_name()) {
                walker.skip_current_dir();
                continue;
            }

            if is_project_root(entry.path()) {
                let absolute = std::path::absolute(entry.path())
                    .unwrap_or_else(|_| entry.path().to_path_buf());
                if seen.insert(absolute.clone()) {
                    roots.push(absolute);
                }
                walker.skip_current_dir();
            }
        }
    }

    roots
}
