use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub ticks: Arc<AtomicU64>,
    pub samples_written: Arc<AtomicU64>,

    // failures
    pub oracle_failures: Arc<AtomicU64>,
    pub storage_failures: Arc<AtomicU64>,
    pub notify_failures: Arc<AtomicU64>,

    // notifications
    pub alerts_fired: Arc<AtomicU64>,
    pub surges_notified: Arc<AtomicU64>,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
