/// Trait for reporting progress through a batch of remote operations.
///
/// CLI implements with indicatif, tests use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_batch_start(&self, _label: &str, _total: usize) {}
    fn on_item(&self, _done: usize, _total: usize) {}
    fn on_batch_complete(&self, _label: &str, _outcome: &BatchOutcome) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Counts of per-item results in one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn record<T, E>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: BatchOutcome) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}
