mod common;

use common::{FakeHome, MB};
use homesweep_lib::scan::{scan_caches, scan_project_artifacts, scan_trash};

#[test]
fn test_cache_entry_sums_nested_files() {
    let home = FakeHome::macos();
    home.file("Library/Caches/AppX/a.bin", 30 * MB);
    home.file("Library/Caches/AppX/deep/b.bin", 25 * MB);

    let caches = scan_caches(&home.catalog(), &[]);
    assert_eq!(caches.len(), 1);
    assert_eq!(caches[0].name, "AppX");
    assert_eq!(caches[0].size_mb(), 55.0);
    assert_eq!(caches[0].category(), "cache");
}

#[test]
fn test_cache_exclusion_by_substring() {
    let home = FakeHome::macos();
    home.file("Library/Caches/AppX/a.bin", 30 * MB);

    let caches = scan_caches(&home.catalog(), &["AppX".to_string()]);
    assert!(caches.is_empty());
}

#[test]
fn test_cache_root_missing() {
    let home = FakeHome::linux();
    assert!(scan_caches(&home.catalog(), &[]).is_empty());
}

#[test]
fn test_trash_with_three_files() {
    let home = FakeHome::macos();
    for name in ["one", "two", "three"] {
        home.file(&format!(".Trash/{}", name), 4 * MB);
    }

    let trash = scan_trash(&home.catalog());
    assert_eq!(trash.size_bytes, 12_582_912);
    assert_eq!(trash.count, 3);
    assert_eq!(trash.size_mb(), 12.0);
}

#[test]
fn test_trash_absent() {
    let home = FakeHome::macos();
    let trash = scan_trash(&home.catalog());
    assert_eq!(trash.size_bytes, 0);
    assert_eq!(trash.count, 0);
}

#[test]
fn test_project_artifacts_grouped_by_pattern() {
    let home = FakeHome::linux();
    home.file("development/web/node_modules/react/index.js", 3 * MB);
    home.file("development/api/node_modules/express/index.js", MB);
    home.file("development/api/src/__pycache__/app.cpython-312.pyc", 1024);

    let groups =
        scan_project_artifacts(&home.path().join("development"), &[], false).unwrap();

    let node = groups.iter().find(|g| g.pattern == "node_modules").unwrap();
    assert_eq!(node.count, 2);
    assert_eq!(node.total_size_bytes, 4 * MB);
    assert_eq!(groups[0].pattern, "node_modules");
    assert!(groups.iter().any(|g| g.pattern == "__pycache__"));
}
