//! Lock-free throughput counter

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counts events (verification requests, chunks) with a lock-free increment
/// and reports per-second throughput between samples. There is no ceiling —
/// the counter exists for operator visibility, not enforcement.
#[derive(Debug)]
pub struct RateCounter {
    hits: AtomicU64,
    total: AtomicU64,
    started: Instant,
    /// Nanoseconds since `started` at the last sample.
    last_sample_nanos: AtomicU64,
}

impl RateCounter {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            total: AtomicU64::new(0),
            started: Instant::now(),
            last_sample_nanos: AtomicU64::new(0),
        }
    }

    pub fn tick(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Events per second since the previous sample. Resets the window.
    pub fn per_second(&self) -> f64 {
        let now_nanos = self.started.elapsed().as_nanos() as u64;
        let prev_nanos = self.last_sample_nanos.swap(now_nanos, Ordering::Relaxed);
        let hits = self.hits.swap(0, Ordering::Relaxed);

        let window_nanos = now_nanos.saturating_sub(prev_nanos);
        if window_nanos == 0 {
            return 0.0;
        }
        hits as f64 * 1_000_000_000.0 / window_nanos as f64
    }
}

impl Default for RateCounter {
    fn default() -> Self {
        Self::new()
    }
}
