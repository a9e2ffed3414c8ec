#![cfg(unix)]

mod common;

use common::FakeHome;
use homesweep_lib::security::check_ssh_permissions;
use homesweep_lib::{scan_security, IssueCategory, SecuritySettings, Severity};

#[test]
fn test_strict_ssh_layout_is_clean() {
    let home = FakeHome::linux();
    home.file(".ssh/id_rsa", 1700);
    home.file(".ssh/id_ed25519", 400);
    home.chmod(".ssh/id_rsa", 0o600);
    home.chmod(".ssh/id_ed25519", 0o600);
    home.chmod(".ssh", 0o700);

    assert!(check_ssh_permissions(&home.path().join(".ssh")).is_empty());
}

#[test]
fn test_group_readable_key_is_one_high_issue() {
    let home = FakeHome::linux();
    home.file(".ssh/id_rsa", 1700);
    home.chmod(".ssh/id_rsa", 0o640);
    home.chmod(".ssh", 0o700);

    let issues = check_ssh_permissions(&home.path().join(".ssh"));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::High);
    assert_eq!(issues[0].category, IssueCategory::SshPermissions);
    assert_eq!(issues[0].path, home.path().join(".ssh/id_rsa"));
}

#[test]
fn test_security_scan_combines_checks() {
    let home = FakeHome::linux();
    home.file(".ssh/id_rsa", 1700);
    home.chmod(".ssh/id_rsa", 0o600);
    home.chmod(".ssh", 0o755);
    home.file("development/app/.env", 64);
    home.chmod("development/app/.env", 0o644);
    home.file("Documents/notes.txt", 10);

    let report = scan_security(&home.catalog(), &SecuritySettings::default()).unwrap();

    assert_eq!(report.sensitive_files.len(), 1);
    assert_eq!(report.sensitive_files[0].pattern, "*.env");
    assert_eq!(report.total_issues, 2);
    assert_eq!(report.high_severity_issues, 2);
    assert!(report
        .issues
        .iter()
        .any(|i| i.category == IssueCategory::FilePermissions));
}

#[test]
fn test_security_checks_can_be_disabled() {
    let home = FakeHome::linux();
    home.dir(".ssh");
    home.chmod(".ssh", 0o777);

    let settings = SecuritySettings {
        sensitive_patterns: Vec::new(),
        check_ssh_permissions: false,
        check_file_permissions: false,
    };
    let report = scan_security(&home.catalog(), &settings).unwrap();
    assert_eq!(report.total_issues, 0);
    assert!(report.sensitive_files.is_empty());
}
