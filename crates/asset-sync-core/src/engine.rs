use crate::analysis::{self, MatchReport, UrlAudit};
use crate::catalog::CatalogSource;
use crate::config::AppConfig;
use crate::convert::{self, ImageConverter};
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::rename;
use crate::report::{ItemStatus, RunReport};
use crate::scanner::{ProductFolder, Walker};
use std::time::Instant;
use tracing::{debug, info};

/// Runs the batch tools against one configured image store.
///
/// Every entry point checks its preconditions (root present, catalog
/// readable) before touching anything and returns `Err` only for those.
/// Problems with individual files or records end up in the returned report.
pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn walker(&self) -> Result<Walker, Error> {
        let walker = Walker::from_config(&self.config)?;
        info!("Using image store at {}", walker.root().display());
        Ok(walker)
    }

    fn product_folders(
        &self,
        walker: &Walker,
        reporter: &dyn ProgressReporter,
    ) -> Vec<ProductFolder> {
        reporter.on_walk_start(&walker.root().display().to_string());
        let start = Instant::now();
        let folders = walker.product_folders(&self.config);
        let images: usize = folders.iter().map(|f| f.images.len()).sum();
        let duration = start.elapsed();
        reporter.on_walk_complete(images, folders.len(), duration.as_secs_f64());
        debug!(
            "Walk completed in {:.2}s: {} product folders, {} images",
            duration.as_secs_f64(),
            folders.len(),
            images
        );
        folders
    }

    /// Inventory: every product folder with its image count.
    pub fn scan(&self, reporter: &dyn ProgressReporter) -> Result<RunReport, Error> {
        let walker = self.walker()?;
        let folders = self.product_folders(&walker, reporter);

        let mut report = RunReport::new("scan", walker.root().display().to_string());
        report.record_walk_failures(walker.take_failures());
        let mut total = 0;
        for folder in &folders {
            total += folder.images.len();
            report.record(
                ItemStatus::Found,
                folder.relative_path.as_str(),
                Some(format!("{} images", folder.images.len())),
            );
        }
        info!("{} folders with {} images", folders.len(), total);
        Ok(report)
    }

    /// Convert legacy-format images to the canonical format.
    pub fn convert(
        &self,
        converter: &dyn ImageConverter,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport, Error> {
        let walker = self.walker()?;
        Ok(convert::convert_legacy_images(
            &walker,
            &self.config,
            converter,
            reporter,
        ))
    }

    /// Rename directories to their canonical (lower-case) names.
    pub fn rename(&self, reporter: &dyn ProgressReporter) -> Result<RunReport, Error> {
        let walker = self.walker()?;
        Ok(rename::rename_directories(&walker, reporter))
    }

    /// Pair product folders with catalog records. Read-only on both sides.
    pub fn match_catalog(
        &self,
        catalog: &dyn CatalogSource,
        reporter: &dyn ProgressReporter,
    ) -> Result<(MatchReport, RunReport), Error> {
        let walker = self.walker()?;
        let records = catalog.active_records()?;
        info!("Matching against {} active catalog records", records.len());

        let folders = self.product_folders(&walker, reporter);
        let matches = analysis::match_catalog(&folders, &records, &self.config.url_prefix);

        let mut report = RunReport::new("match", walker.root().display().to_string());
        matches.write_to(&mut report);
        report.record_walk_failures(walker.take_failures());
        info!(
            "{} matched, {} unmatched, {} orphaned, {} conflicts",
            report.counts.matched,
            report.counts.unmatched,
            report.counts.orphaned,
            report.counts.conflicts
        );
        Ok((matches, report))
    }

    /// List catalog image URLs that are not under the configured prefix.
    pub fn audit_urls(
        &self,
        catalog: &dyn CatalogSource,
    ) -> Result<(Vec<UrlAudit>, RunReport), Error> {
        let records = catalog.active_records()?;
        let audits = analysis::audit_image_urls(&records, &self.config.url_prefix);

        let mut report = RunReport::new("audit-urls", self.config.url_prefix.as_str());
        analysis::write_audit(&audits, &mut report);
        info!(
            "{} of {} records have non-canonical image URLs",
            audits.len(),
            records.len()
        );
        Ok((audits, report))
    }
}
