//! Permission-tolerant size accounting.
//!
//! The walk yields one `(path, result)` pair per regular file or per entry that
//! could not be inspected. Callers decide whether to count, log or ignore the
//! errors; a bad entry never stops the walk. Symlinks below the starting path
//! are not followed and contribute nothing.

use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An entry that could not be sized during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

pub type SizedEntry = (PathBuf, Result<u64, WalkError>);

/// Aggregate of a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeReport {
    pub bytes: u64,
    pub files: usize,
    pub errors: usize,
}

/// Walk `path` and yield the size of every regular file beneath it.
///
/// A missing path yields nothing. A regular file yields itself.
pub fn walk_sizes(path: &Path) -> Box<dyn Iterator<Item = SizedEntry> + Send> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Box::new(std::iter::empty()),
        Err(e) => {
            let error = WalkError {
                path: path.to_path_buf(),
                message: e.to_string(),
            };
            return Box::new(std::iter::once((path.to_path_buf(), Err(error))));
        }
    };

    if metadata.is_file() {
        return Box::new(std::iter::once((path.to_path_buf(), Ok(metadata.len()))));
    }

    if !metadata.is_dir() {
        return Box::new(std::iter::empty());
    }

    let root = path.to_path_buf();
    let walker = WalkDir::new(path).follow_links(false).min_depth(1);

    Box::new(walker.into_iter().filter_map(move |entry| match entry {
        Ok(entry) => {
            if !entry.file_type().is_file() {
                return None;
            }
            let size = entry.metadata().map(|m| m.len()).map_err(|e| WalkError {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            });
            Some((entry.into_path(), size))
        }
        Err(e) => {
            let failed = e.path().unwrap_or(root.as_path()).to_path_buf();
            let message = e
                .io_error()
                .map(|io| io.to_string())
                .unwrap_or_else(|| e.to_string());
            Some((
                failed.clone(),
                Err(WalkError {
                    path: failed,
                    message,
                }),
            ))
        }
    }))
}

/// Fold a walk into totals, logging each failed entry at debug level.
pub fn measure(path: &Path) -> SizeReport {
    let mut report = SizeReport::default();

    for (_, result) in walk_sizes(path) {
        match result {
            Ok(size) => {
                report.bytes += size;
                report.files += 1;
            }
            Err(e) => {
                log::debug!("Skipping unreadable entry {}", e);
                report.errors += 1;
            }
        }
    }

    report
}

/// Total size in bytes of a file or directory subtree. Never fails; unreadable
/// entries count as zero.
pub fn size_of(path: &Path) -> u64 {
    measure(path).bytes
}

/// Most recent of access and modification time.
pub fn last_accessed(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).ok()?;
    let accessed = metadata.accessed().ok();
    let modified = metadata.modified().ok();

    accessed
        .into_iter()
        .chain(modified)
        .max()
        .map(DateTime::<Utc>::from)
}
