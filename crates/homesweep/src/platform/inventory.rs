//! Installed-application enumeration.
//!
//! Each source is optional: a missing binary, a timeout or a non-zero exit
//! leaves that source empty instead of failing the scan.

use super::Platform;
use crate::error::{HomesweepError, Result};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of lowercased installed-application identifiers.
pub trait AppInventory: Sync {
    fn installed_apps(&self) -> HashSet<String>;
}

/// Fixed set of identifiers.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    apps: HashSet<String>,
}

impl StaticInventory {
    pub fn new<I, S>(apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            apps: apps.into_iter().map(|a| a.as_ref().to_lowercase()).collect(),
        }
    }
}

impl AppInventory for StaticInventory {
    fn installed_apps(&self) -> HashSet<String> {
        self.apps.clone()
    }
}

/// Queries the host: `/Applications` bundles on macOS, package managers,
/// Flatpak and Snap elsewhere.
#[derive(Debug, Clone)]
pub struct SystemInventory {
    platform: Platform,
    applications_dir: PathBuf,
    timeout: Duration,
}

impl SystemInventory {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            applications_dir: PathBuf::from("/Applications"),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_applications_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.applications_dir = dir.into();
        self
    }

    fn package_manager_apps(&self) -> HashSet<String> {
        let managers: [(&str, &[&str], fn(&str) -> HashSet<String>); 3] = [
            ("dpkg", &["-l"], parse_dpkg),
            ("rpm", &["-qa"], parse_rpm),
            ("pacman", &["-Q"], parse_pacman),
        ];

        for (program, args, parser) in managers {
            match run_with_timeout(program, args, None, self.timeout) {
                Ok(output) if output.success => return parser(&output.stdout),
                Ok(_) => log::debug!("{} exited unsuccessfully", program),
                Err(e) => log::debug!("Package manager unavailable: {}", e),
            }
        }

        HashSet::new()
    }

    fn tool_apps(&self, program: &str, args: &[&str], parser: fn(&str) -> HashSet<String>) -> HashSet<String> {
        match run_with_timeout(program, args, None, self.timeout) {
            Ok(output) if output.success => parser(&output.stdout),
            Ok(_) => HashSet::new(),
            Err(e) => {
                log::debug!("{} unavailable: {}", program, e);
                HashSet::new()
            }
        }
    }
}

impl AppInventory for SystemInventory {
    fn installed_apps(&self) -> HashSet<String> {
        match self.platform {
            Platform::MacOs => macos_bundles(&self.applications_dir),
            Platform::Linux | Platform::Unknown => {
                let mut apps = self.package_manager_apps();
                apps.extend(self.tool_apps("flatpak", &["list", "--app"], parse_flatpak));
                apps.extend(self.tool_apps("snap", &["list"], parse_snap));
                apps
            }
        }
    }
}

/// Lowercased stems of `*.app` bundles in `dir`.
pub fn macos_bundles(dir: &Path) -> HashSet<String> {
    let mut apps = HashSet::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Cannot list {}: {}", dir.display(), e);
            return apps;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|e| e == "app").unwrap_or(false) {
            if let Some(stem) = path.file_stem() {
                apps.insert(stem.to_string_lossy().to_lowercase());
            }
        }
    }

    apps
}

pub fn parse_dpkg(output: &str) -> HashSet<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|name| name.to_lowercase())
        .collect()
}

pub fn parse_rpm(output: &str) -> HashSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_lowercase())
        .collect()
}

pub fn parse_pacman(output: &str) -> HashSet<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(|name| name.to_lowercase())
        .collect()
}

/// Last dotted component of each application ID, header skipped.
pub fn parse_flatpak(output: &str) -> HashSet<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .filter_map(|id| id.rsplit('.').next())
        .map(|name| name.to_lowercase())
        .collect()
}

pub fn parse_snap(output: &str) -> HashSet<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(|name| name.to_lowercase())
        .collect()
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
}

/// Run an external program, killing it once `timeout` elapses.
///
/// Spawn failures and timeouts are errors; a non-zero exit is reported through
/// `CommandOutput::success` so callers can still read stdout.
pub fn run_with_timeout(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|e| HomesweepError::ExternalTool {
        tool: program.to_string(),
        message: e.to_string(),
    })?;

    let mut stdout = child.stdout.take().ok_or_else(|| HomesweepError::ExternalTool {
        tool: program.to_string(),
        message: "stdout not captured".to_string(),
    })?;

    // drain the pipe concurrently so a chatty child cannot block on a full buffer
    let reader = std::thread::spawn(move || {
        let mut buffer = String::new();
        let _ = stdout.read_to_string(&mut buffer);
        buffer
    });

    match child.wait_timeout(timeout)? {
        Some(status) => {
            let stdout = reader.join().unwrap_or_default();
            Ok(CommandOutput {
                success: status.success(),
                stdout,
            })
        }
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(HomesweepError::ExternalTool {
                tool: program.to_string(),
                message: format!("timed out after {}s", timeout.as_secs()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_static_inventory_lowercases() {
        let inventory = StaticInventory::new(["Slack", "zoom"]);
        let apps = inventory.installed_apps();
        assert!(apps.contains("slack"));
        assert!(apps.contains("zoom"));
    }

    #[test]
    fn test_parse_dpkg() {
        let output = "Desired=Unknown\n\
                      ii  firefox  120.0  amd64  browser\n\
                      ii  Vim      9.0    amd64  editor\n";
        let apps = parse_dpkg(output);
        assert!(apps.contains("firefox"));
        assert!(apps.contains("vim"));
    }

    #[test]
    fn test_parse_rpm_and_pacman() {
        let rpm = parse_rpm("bash-5.2-1.x86_64\n\n  curl-8.0 \n");
        assert_eq!(rpm.len(), 2);
        assert!(rpm.contains("curl-8.0"));

        let pacman = parse_pacman("firefox 120.0-1\nneovim 0.9.4-1\n");
        assert!(pacman.contains("neovim"));
    }

    #[test]
    fn test_parse_flatpak_uses_last_component() {
        let output = "Application ID\norg.mozilla.Firefox\ncom.spotify.Client\n";
        let apps = parse_flatpak(output);
        assert_eq!(apps.len(), 2);
        assert!(apps.contains("firefox"));
        assert!(apps.contains("client"));
    }

    #[test]
    fn test_parse_snap_skips_header() {
        let output = "Name  Version  Rev\ncode  1.85  150\nspotify 1.2 70\n";
        let apps = parse_snap(output);
        assert_eq!(apps.len(), 2);
        assert!(!apps.contains("name"));
    }

    #[test]
    fn test_macos_bundles() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Safari.app")).unwrap();
        fs::create_dir(temp_dir.path().join("Utilities")).unwrap();

        let apps = macos_bundles(temp_dir.path());
        assert_eq!(apps.len(), 1);
        assert!(apps.contains("safari"));
        assert!(macos_bundles(&temp_dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_system_inventory_reads_applications_dir_on_macos() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Notion.app")).unwrap();

        let inventory =
            SystemInventory::new(Platform::MacOs).with_applications_dir(temp_dir.path());
        assert!(inventory.installed_apps().contains("notion"));
    }

    #[test]
    fn test_run_with_timeout_missing_binary() {
        let result = run_with_timeout(
            "definitely-not-a-real-binary-xyz",
            &[],
            None,
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(HomesweepError::ExternalTool { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_captures_stdout() {
        let output = run_with_timeout("sh", &["-c", "echo hello"], None, Duration::from_secs(5)).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_kills_slow_process() {
        let result = run_with_timeout("sleep", &["5"], None, Duration::from_millis(200));
        assert!(matches!(result, Err(HomesweepError::ExternalTool { .. })));
    }
}
