use asset_sync_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Walk: spinner (nothing is known upfront)
/// - Batch (convert/rename): progress bar, total known from the walk
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Some(old) = self.bar.borrow_mut().replace(pb) {
            old.finish_and_clear();
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

impl ProgressReporter for CliReporter {
    fn on_walk_start(&self, root: &str) {
        self.set_bar(spinner(format!("Scanning {}...", root)));
    }

    fn on_walk_complete(&self, files: usize, directories: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} images in {} folders in {:.2}s",
            files, directories, duration_secs
        );
    }

    fn on_batch_start(&self, phase: &str, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} {prefix} [{bar:30.cyan/dim}] {pos}/{len} {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.set_prefix(phase.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_item(&self, done: usize, current: &str) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_position(done as u64);
            pb.set_message(current.to_string());
        }
    }

    fn on_batch_complete(&self, phase: &str, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m {} complete in {:.2}s",
            phase, duration_secs
        );
    }
}
