//! Progress side channel of a scan.

use tracing::info;

/// Observer for scan progress. Every method defaults to a no-op.
pub trait Progress: Send + Sync {
    /// Candidates generated for `watched`, about to be enriched
    fn scan_started(&self, _watched: &str, _candidates: usize) {}

    /// One candidate finished enrichment and the novelty check
    fn candidate_done(&self, _candidate: &str) {}

    /// Scan of `watched` is complete
    fn scan_finished(&self, _watched: &str, _considered: usize, _discovered: usize) {}
}

/// Reports progress through `tracing`
#[derive(Debug, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn scan_started(&self, watched: &str, candidates: usize) {
        info!(watched, candidates, "found {} variant domains", candidates);
    }

    fn scan_finished(&self, watched: &str, considered: usize, discovered: usize) {
        info!(watched, considered, discovered, "scan finished");
    }
}
