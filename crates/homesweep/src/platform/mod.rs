pub mod inventory;
pub mod paths;
pub mod space;

pub use inventory::{run_with_timeout, AppInventory, CommandOutput, StaticInventory, SystemInventory};
pub use paths::{
    find_project_roots, is_project_root, non_overlapping_roots, PathCatalog, PROJECT_MARKERS,
};
pub use space::{get_disk_space, DiskSpace};

use serde::{Deserialize, Serialize};

/// Host layout family. Passed explicitly to everything that depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Linux,
    Unknown,
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "macos" | "darwin" => Ok(Platform::MacOs),
            "linux" => Ok(Platform::Linux),
            "unknown" => Ok(Platform::Unknown),
            _ => Err(format!("Invalid platform: {}", s)),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
            Platform::Unknown => "Unknown",
        }
    }

    /// Layout family used for path resolution; anything unrecognized uses Linux.
    pub fn effective(&self) -> Self {
        match self {
            Platform::MacOs => Platform::MacOs,
            Platform::Linux | Platform::Unknown => Platform::Linux,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("freebsd"), Platform::Unknown);
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!(Platform::from_str("Darwin").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_str("linux").unwrap(), Platform::Linux);
        assert!(Platform::from_str("plan9").is_err());
    }

    #[test]
    fn test_platform_effective() {
        assert_eq!(Platform::Unknown.effective(), Platform::Linux);
        assert_eq!(Platform::MacOs.effective(), Platform::MacOs);
    }

    #[test]
    fn test_platform_serde_names() {
        assert_eq!(serde_json::to_string(&Platform::MacOs).unwrap(), "\"macos\"");
        let parsed: Platform = serde_json::from_str("\"linux\"").unwrap();
        assert_eq!(parsed, Platform::Linux);
    }
}
