pub mod command;

use crate::config::AppConfig;
use crate::error::ConvertError;
use crate::progress::ProgressReporter;
use crate::report::{ItemStatus, RunReport};
use crate::scanner::{FileAsset, Walker};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub use command::CommandConverter;

/// Produces a canonical-format copy of an image.
///
/// Implementations write `target` from `source` and return the path they
/// actually wrote. They must not touch `source`.
pub trait ImageConverter {
    fn convert(&self, source: &Path, target: &Path) -> Result<PathBuf, ConvertError>;
}

/// Convert every legacy-format image under the walker's root.
///
/// A source file is deleted only after its own conversion succeeded and the
/// output is on disk. When the canonical sibling already exists the file is
/// skipped and the source is kept, so running this twice is harmless.
/// Per-file failures are recorded and the batch moves on.
pub fn convert_legacy_images(
    walker: &Walker,
    config: &AppConfig,
    converter: &dyn ImageConverter,
    reporter: &dyn ProgressReporter,
) -> RunReport {
    let canonical = config.canonical_extension();
    let mut report = RunReport::new("convert", walker.root().display().to_string());

    // Materialized up front: converting adds and removes files in the
    // directories still being walked.
    let legacy: Vec<FileAsset> = walker
        .files()
        .filter(|f| config.is_legacy(&f.extension))
        .collect();
    report.record_walk_failures(walker.take_failures());
    info!(
        "Found {} legacy image(s) ({}) under {}",
        legacy.len(),
        config.legacy_extensions.join(", "),
        walker.root().display()
    );

    let start = Instant::now();
    reporter.on_batch_start("convert", legacy.len());
    for (done, file) in legacy.iter().enumerate() {
        reporter.on_item(done, &file.relative_path);
        convert_one(file, &canonical, converter, &mut report);
    }
    reporter.on_batch_complete("convert", start.elapsed().as_secs_f64());

    info!(
        "Conversion finished: {} converted, {} removed, {} skipped, {} failed",
        report.counts.converted, report.counts.removed, report.counts.skipped, report.counts.failed
    );
    report
}

fn convert_one(
    file: &FileAsset,
    canonical: &str,
    converter: &dyn ImageConverter,
    report: &mut RunReport,
) {
    let target = file.sibling_with_extension(canonical);
    let target_rel = relative_sibling(file, canonical);

    if fs::symlink_metadata(&target).is_ok() {
        debug!("Skip (exists): {} -> {}", file.relative_path, target_rel);
        report.record(
            ItemStatus::Skipped,
            file.relative_path.as_str(),
            Some(format!("{} already exists", target_rel)),
        );
        return;
    }

    let produced = match converter.convert(&file.path, &target) {
        Ok(produced) => produced,
        Err(e) => {
            error!("Failed: {}: {}", file.relative_path, e);
            discard_partial(&target);
            report.record(ItemStatus::Failed, file.relative_path.as_str(), Some(e.to_string()));
            return;
        }
    };

    if !produced.is_file() {
        let e = ConvertError::MissingOutput(produced);
        error!("Failed: {}: {}", file.relative_path, e);
        discard_partial(&target);
        report.record(ItemStatus::Failed, file.relative_path.as_str(), Some(e.to_string()));
        return;
    }

    match fs::remove_file(&file.path) {
        Ok(()) => {
            debug!("Converted: {} -> {}", file.relative_path, target_rel);
            report.record(
                ItemStatus::Converted,
                file.relative_path.as_str(),
                Some(format!("{}, source removed", target_rel)),
            );
            report.count_removed();
        }
        Err(e) => {
            warn!(
                "Converted {} but could not remove the source: {}",
                file.relative_path, e
            );
            report.record(
                ItemStatus::Failed,
                file.relative_path.as_str(),
                Some(format!("converted to {} but source not removed: {}", target_rel, e)),
            );
        }
    }
}

/// The target was absent before the converter ran, so anything there now is
/// a half-written output. Left in place it would make the next run skip
/// the source as already converted.
fn discard_partial(target: &Path) {
    if fs::symlink_metadata(target).is_err() {
        return;
    }
    match fs::remove_file(target) {
        Ok(()) => debug!("Removed partial output {}", target.display()),
        Err(e) => warn!("Could not remove partial output {}: {}", target.display(), e),
    }
}

fn relative_sibling(file: &FileAsset, extension: &str) -> String {
    let name = format!("{}.{}", file.base_name, extension);
    match file.relative_path.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, name),
        None => name,
    }
}
