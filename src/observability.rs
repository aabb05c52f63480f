//! Tracing setup and in-process counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Batch and file counters, reported by `/health`
#[derive(Debug, Default)]
pub struct Metrics {
    batches_accepted: AtomicU64,
    batches_failed: AtomicU64,
    files_uploaded: AtomicU64,
    files_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_accepted(&self) {
        self.batches_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "batches_accepted", "Metric incremented");
    }

    pub fn batch_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "batches_failed", "Metric incremented");
    }

    pub fn files_uploaded(&self, count: usize) {
        self.files_uploaded.fetch_add(count as u64, Ordering::Relaxed);
        tracing::debug!(counter = "files_uploaded", count, "Metric incremented");
    }

    pub fn files_failed(&self, count: usize) {
        self.files_failed.fetch_add(count as u64, Ordering::Relaxed);
        tracing::debug!(counter = "files_failed", count, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_accepted: self.batches_accepted.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            files_uploaded: self.files_uploaded.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub batches_accepted: u64,
    pub batches_failed: u64,
    pub files_uploaded: u64,
    pub files_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.batch_accepted();
        metrics.batch_accepted();
        metrics.batch_failed();
        metrics.files_uploaded(3);
        metrics.files_failed(1);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                batches_accepted: 2,
                batches_failed: 1,
                files_uploaded: 3,
                files_failed: 1,
            }
        );
    }
}
