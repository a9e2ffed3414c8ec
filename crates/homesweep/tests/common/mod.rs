#![allow(dead_code)]

use homesweep_lib::{PathCatalog, Platform, Settings};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MB: u64 = 1024 * 1024;

/// A throwaway home directory laid out like a real one.
pub struct FakeHome {
    pub temp_dir: TempDir,
    pub platform: Platform,
}

impl FakeHome {
    pub fn new(platform: Platform) -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            platform,
        }
    }

    pub fn linux() -> Self {
        Self::new(Platform::Linux)
    }

    pub fn macos() -> Self {
        Self::new(Platform::MacOs)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn catalog(&self) -> PathCatalog {
        PathCatalog::new(self.path(), self.platform)
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.path().join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Sparse file of `len` bytes, parents created.
    pub fn file(&self, rel: &str, len: u64) -> PathBuf {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(&path).unwrap().set_len(len).unwrap();
        path
    }

    #[cfg(unix)]
    pub fn chmod(&self, rel: &str, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(self.path().join(rel), fs::Permissions::from_mode(mode)).unwrap();
    }
}

/// Defaults with the passes that shell out to external tools turned off.
pub fn offline_settings() -> Settings {
    let mut settings = Settings::default();
    settings.scan.check_dependencies = false;
    settings
}
