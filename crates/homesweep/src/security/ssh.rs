use super::{format_mode, IssueCategory, SecurityIssue, Severity};
use std::fs;
use std::path::Path;

/// Private key file names checked inside the SSH directory.
pub const PRIVATE_KEY_NAMES: &[&str] = &["id_rsa", "id_ed25519", "id_ecdsa", "id_dsa"];

const SSH_DIR_MODE: u32 = 0o700;
const PRIVATE_KEY_MODE: u32 = 0o600;

#[cfg(unix)]
fn mode_of(path: &Path) -> Option<(u32, bool)> {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(metadata) => Some((metadata.permissions().mode() & 0o7777, metadata.is_dir())),
        Err(e) => {
            log::warn!("Cannot read permissions of {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(not(unix))]
fn mode_of(_path: &Path) -> Option<(u32, bool)> {
    None
}

/// The SSH directory must be exactly `0700` and each present private key
/// exactly `0600`. Any other mode is a high-severity issue. A missing
/// directory yields no issues.
pub fn check_ssh_permissions(ssh_dir: &Path) -> Vec<SecurityIssue> {
    let mut issues = Vec::new();

    if !ssh_dir.is_dir() {
        log::debug!("SSH directory not found: {}", ssh_dir.display());
        return issues;
    }

    if let Some((mode, is_dir)) = mode_of(ssh_dir) {
        if mode != SSH_DIR_MODE {
            issues.push(SecurityIssue {
                severity: Severity::High,
                category: IssueCategory::SshPermissions,
                path: ssh_dir.to_path_buf(),
                description: format!(
                    "Incorrect permissions on SSH directory: {} (expected {})",
                    format_mode(mode, is_dir),
                    format_mode(SSH_DIR_MODE, true)
                ),
                recommendation: Some(format!("Run: chmod 700 {}", ssh_dir.display())),
            });
        }
    }

    for key_name in PRIVATE_KEY_NAMES {
        let key = ssh_dir.join(key_name);
        if !key.exists() {
            continue;
        }

        if let Some((mode, is_dir)) = mode_of(&key) {
            if mode != PRIVATE_KEY_MODE {
                issues.push(SecurityIssue {
                    severity: Severity::High,
                    category: IssueCategory::SshPermissions,
                    path: key.clone(),
                    description: format!(
                        "Incorrect permissions on private key: {} (expected {})",
                        format_mode(mode, is_dir),
                        format_mode(PRIVATE_KEY_MODE, false)
                    ),
                    recommendation: Some(format!("Run: chmod 600 {}", key.display())),
                });
            }
        }
    }

    issues
}
