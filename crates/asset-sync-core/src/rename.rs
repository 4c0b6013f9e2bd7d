use crate::normalize::canonical_dir_name;
use crate::progress::ProgressReporter;
use crate::report::{Conflict, ItemStatus, RunReport};
use crate::scanner::{DepthOrder, DirectoryNode, Walker};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of renaming a single directory.
#[derive(Debug)]
pub enum RenameOutcome {
    Renamed(PathBuf),
    Conflict(Conflict),
}

/// Bring every directory name under the walker's root into canonical form.
///
/// All directories are collected before anything is touched and processed
/// deepest first: a rename only ever changes the paths of entries below the
/// renamed directory, and those have already been handled.
pub fn rename_directories(walker: &Walker, reporter: &dyn ProgressReporter) -> RunReport {
    let mut report = RunReport::new("rename", walker.root().display().to_string());

    let pending: Vec<DirectoryNode> = walker
        .directories(DepthOrder::DeepestFirst)
        .into_iter()
        .filter(|dir| canonical_dir_name(&dir.name) != dir.name)
        .collect();
    report.record_walk_failures(walker.take_failures());
    info!(
        "{} folder(s) under {} need renaming",
        pending.len(),
        walker.root().display()
    );

    let start = Instant::now();
    reporter.on_batch_start("rename", pending.len());
    for (done, dir) in pending.iter().enumerate() {
        let subject = relative_to(walker.root(), &dir.path);
        reporter.on_item(done, &subject);

        // `dir.name` is lossy; the rename needs the exact on-disk name.
        let Some(name) = dir.path.file_name().and_then(OsStr::to_str) else {
            warn!("Not renaming {}: name is not valid UTF-8", dir.path.display());
            report.record(
                ItemStatus::Failed,
                subject,
                Some("name is not valid UTF-8".to_string()),
            );
            continue;
        };

        let target_name = canonical_dir_name(name);
        match rename_directory(&dir.path, &target_name, done) {
            Ok(RenameOutcome::Renamed(target)) => {
                debug!("Renamed: {} -> {}", dir.path.display(), target.display());
                report.record(
                    ItemStatus::Renamed,
                    subject,
                    Some(relative_to(walker.root(), &target)),
                );
            }
            Ok(RenameOutcome::Conflict(conflict)) => {
                info!("Skip: {}", conflict);
                report.record_conflict(subject, &conflict);
            }
            Err(e) => {
                error!("Failed: {} -> {}: {}", dir.path.display(), target_name, e);
                report.record(ItemStatus::Failed, subject, Some(e.to_string()));
            }
        }
    }
    reporter.on_batch_complete("rename", start.elapsed().as_secs_f64());

    info!(
        "Rename finished: {} renamed, {} conflicts, {} failed",
        report.counts.renamed, report.counts.conflicts, report.counts.failed
    );
    report
}

/// Rename `source` to `target_name` within the same parent directory.
///
/// The move goes through a temporary sibling (`seq` keeps temp names apart
/// within one run) so a case-only change works on case-insensitive
/// filesystems. If the second step fails the first is undone, so on `Err`
/// the directory still has its original name unless the error says otherwise.
pub fn rename_directory(source: &Path, target_name: &str, seq: usize) -> io::Result<RenameOutcome> {
    let parent = source.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "directory has no parent")
    })?;
    let source_name = source.file_name().unwrap_or_default();
    let target = parent.join(target_name);

    if source_name == OsStr::new(target_name) {
        return Ok(RenameOutcome::Renamed(target));
    }

    if has_entry_named(parent, target_name)? {
        return Ok(RenameOutcome::Conflict(Conflict::RenameTargetExists {
            source: source.display().to_string(),
            target: target.display().to_string(),
        }));
    }

    let temp = parent.join(format!(".asset-sync-{}-{}", process::id(), seq));
    fs::rename(source, &temp)?;

    if let Err(e) = fs::rename(&temp, &target) {
        return match fs::rename(&temp, source) {
            Ok(()) => Err(e),
            Err(rollback) => Err(io::Error::new(
                e.kind(),
                format!(
                    "{}; rollback also failed, directory left at {}: {}",
                    e,
                    temp.display(),
                    rollback
                ),
            )),
        };
    }

    Ok(RenameOutcome::Renamed(target))
}

/// Exact-name lookup in `parent`. A case-insensitive filesystem reports the
/// source itself as existing under its lower-case name, so `Path::exists` on
/// the target can't tell a pure case change from a real clash.
fn has_entry_named(parent: &Path, name: &str) -> io::Result<bool> {
    for entry in fs::read_dir(parent)? {
        if entry?.file_name().as_os_str() == OsStr::new(name) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rename_directory_case_change() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("Classic V Cut");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.png"), b"x").unwrap();

        let outcome = rename_directory(&source, "classic v cut", 0).unwrap();
        let target = tmp.path().join("classic v cut");
        assert!(matches!(outcome, RenameOutcome::Renamed(ref p) if p == &target));
        assert!(target.join("a.png").is_file());

        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    // Needs a case-sensitive filesystem to hold both names at once.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_rename_directory_conflict_leaves_source() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("Men");
        let existing = tmp.path().join("men");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&existing).unwrap();
        fs::write(source.join("a.png"), b"a").unwrap();
        fs::write(existing.join("b.png"), b"b").unwrap();

        match rename_directory(&source, "men", 0).unwrap() {
            RenameOutcome::Conflict(Conflict::RenameTargetExists { .. }) => {}
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(source.join("a.png").is_file());
        assert!(existing.join("b.png").is_file());
        assert!(!existing.join("a.png").exists());
    }

    #[test]
    fn test_rename_missing_source_is_error() {
        let tmp = tempdir().unwrap();
        let result = rename_directory(&tmp.path().join("Gone"), "gone", 0);
        assert!(result.is_err());
        assert!(!tmp.path().join("gone").exists());
    }

    #[test]
    fn test_failed_second_step_rolls_back() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("Vest");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.png"), b"x").unwrap();

        // The target's parent does not exist, so only the temp -> target step fails.
        let err = rename_directory(&source, "missing/vest", 7).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        assert!(source.join("a.png").is_file());
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsStr::new("Vest").to_os_string()]);
    }
}
