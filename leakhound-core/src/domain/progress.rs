//! Scan progress reporting

use std::sync::Mutex;

use serde::Serialize;

/// Snapshot of a source's progress, readable by the caller at any time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Progress {
    pub percent_complete: i64,
    /// Name of the section currently being worked (a repo URL, a bucket, a
    /// listener address).
    pub section_name: String,
    pub chunks_scanned: u64,
    pub chunks_skipped: u64,
    pub message: String,
}

/// Mutex-guarded progress record. Updates hold the lock only long enough to
/// write a few fields; no I/O happens under the lock.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    inner: Mutex<Progress>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_section(&self, section: impl Into<String>) {
        if let Ok(mut p) = self.inner.lock() {
            p.section_name = section.into();
        }
    }

    /// Record progress through a known amount of work.
    pub fn set_complete(&self, done: u64, total: u64, message: impl Into<String>) {
        if let Ok(mut p) = self.inner.lock() {
            p.percent_complete = if total == 0 {
                100
            } else {
                (done.min(total) * 100 / total) as i64
            };
            p.message = message.into();
        }
    }

    pub fn record_scanned(&self) {
        if let Ok(mut p) = self.inner.lock() {
            p.chunks_scanned += 1;
        }
    }

    pub fn record_skipped(&self) {
        if let Ok(mut p) = self.inner.lock() {
            p.chunks_skipped += 1;
        }
    }

    pub fn snapshot(&self) -> Progress {
        self.inner.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_saturates_at_total() {
        let tracker = ProgressTracker::new();
        tracker.set_complete(7, 4, "over-reported");
        assert_eq!(tracker.snapshot().percent_complete, 100);
    }

    #[test]
    fn zero_total_reads_as_done() {
        let tracker = ProgressTracker::new();
        tracker.set_complete(0, 0, "empty source");
        assert_eq!(tracker.snapshot().percent_complete, 100);
    }

    #[test]
    fn counters_accumulate() {
        let tracker = ProgressTracker::new();
        tracker.record_scanned();
        tracker.record_scanned();
        tracker.record_skipped();
        let snap = tracker.snapshot();
        assert_eq!(snap.chunks_scanned, 2);
        assert_eq!(snap.chunks_skipped, 1);
    }
}
