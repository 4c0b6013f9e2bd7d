use std::fs;
use std::path::Path;
use tempfile::tempdir;

use asset_sync_core::rename::rename_directories;
use asset_sync_core::scanner::Walker;
use asset_sync_core::{AppConfig, ItemStatus, Pipeline, SilentReporter};

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_nested_directories_renamed_bottom_up() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("A/B/C")).unwrap();
    fs::write(tmp.path().join("A/B/C/front.png"), b"x").unwrap();
    fs::write(tmp.path().join("A/B/side.png"), b"y").unwrap();

    let walker = Walker::new(tmp.path(), &[]).unwrap();
    let report = rename_directories(&walker, &SilentReporter);

    assert_eq!(report.counts.renamed, 3);
    assert_eq!(report.counts.failed, 0);
    assert_eq!(report.counts.conflicts, 0);

    assert!(tmp.path().join("a/b/c/front.png").is_file());
    assert!(tmp.path().join("a/b/side.png").is_file());
    assert_eq!(names_in(tmp.path()), vec!["a"]);
    assert_eq!(names_in(&tmp.path().join("a")), vec!["b"]);
    assert_eq!(names_in(&tmp.path().join("a/b")), vec!["c", "side.png"]);

    let renamed: Vec<String> = report
        .items_with(ItemStatus::Renamed)
        .map(|item| item.subject.clone())
        .collect();
    assert_eq!(renamed, vec!["A/B/C", "A/B", "A"]);
}

#[test]
fn test_already_canonical_tree_is_untouched() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("men/classic v cut")).unwrap();

    let walker = Walker::new(tmp.path(), &[]).unwrap();
    let report = rename_directories(&walker, &SilentReporter);

    assert!(report.items.is_empty());
    assert!(tmp.path().join("men/classic v cut").is_dir());
}

#[test]
fn test_second_run_is_a_no_op() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("Men/Vest")).unwrap();

    let walker = Walker::new(tmp.path(), &[]).unwrap();
    let first = rename_directories(&walker, &SilentReporter);
    assert_eq!(first.counts.renamed, 2);

    let second = rename_directories(&walker, &SilentReporter);
    assert_eq!(second.counts.renamed, 0);
    assert!(second.items.is_empty());
    assert!(tmp.path().join("men/vest").is_dir());
}

// Needs a case-sensitive filesystem to hold both names at once.
#[cfg(target_os = "linux")]
#[test]
fn test_conflict_leaves_source_untouched() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("Women/Panties")).unwrap();
    fs::create_dir_all(root.join("women")).unwrap();
    fs::write(root.join("Women/Panties/a.png"), b"a").unwrap();
    fs::write(root.join("women/keep.png"), b"k").unwrap();

    let walker = Walker::new(root, &[]).unwrap();
    let report = rename_directories(&walker, &SilentReporter);

    // The child is renamed inside its untouched parent; the parent clashes.
    assert_eq!(report.counts.renamed, 1);
    assert_eq!(report.counts.conflicts, 1);
    assert!(root.join("Women/panties/a.png").is_file());
    assert_eq!(names_in(&root.join("women")), vec!["keep.png"]);
    assert_eq!(names_in(root), vec!["Women", "women"]);

    let conflict = report.items_with(ItemStatus::Conflict).next().unwrap();
    assert_eq!(conflict.subject, "Women");
    assert!(conflict.detail.as_ref().unwrap().contains("already exists"));
}

#[test]
fn test_pipeline_rename_missing_root_is_fatal() {
    let tmp = tempdir().unwrap();
    let config = AppConfig::default().with_root(tmp.path().join("missing"));
    assert!(Pipeline::new(config).rename(&SilentReporter).is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_directory_is_reported_and_left_alone() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let odd = root.join(OsStr::from_bytes(b"Ab\xff"));
    fs::create_dir_all(&odd).unwrap();
    fs::create_dir_all(root.join("Men")).unwrap();

    let walker = Walker::new(root, &[]).unwrap();
    let report = rename_directories(&walker, &SilentReporter);

    assert_eq!(report.counts.renamed, 1);
    assert_eq!(report.counts.failed, 1);
    assert!(odd.is_dir());
    assert!(root.join("men").is_dir());

    let failed = report.items_with(ItemStatus::Failed).next().unwrap();
    assert_eq!(failed.detail.as_deref(), Some("name is not valid UTF-8"));
}
