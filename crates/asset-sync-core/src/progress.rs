/// Trait for reporting batch progress.
///
/// The CLI implements it with indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_walk_start(&self, _root: &str) {}
    fn on_walk_complete(&self, _files: usize, _directories: usize, _duration_secs: f64) {}
    fn on_batch_start(&self, _phase: &str, _total: usize) {}
    fn on_item(&self, _done: usize, _current: &str) {}
    fn on_batch_complete(&self, _phase: &str, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
