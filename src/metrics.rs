//! Lightweight global metrics.
//!
//! Thread-safe atomic counters for the claim store:
//! - saves / rejections
//! - background flushes
//! - close-time full writes

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Claims -----
static CLAIMS_SAVED: AtomicU64 = AtomicU64::new(0);
static CLAIMS_SAVED_MEMORY_ONLY: AtomicU64 = AtomicU64::new(0);
static CLAIMS_REJECTED: AtomicU64 = AtomicU64::new(0);

// ----- Flushes -----
static FLUSHES_COMPLETED: AtomicU64 = AtomicU64::new(0);
static FLUSH_SLOTS_WRITTEN: AtomicU64 = AtomicU64::new(0);
static FLUSH_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static FLUSH_ERRORS: AtomicU64 = AtomicU64::new(0);

// ----- Close -----
static CLOSE_FULL_WRITES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub claims_saved: u64,
    pub claims_saved_memory_only: u64,
    pub claims_rejected: u64,

    pub flushes_completed: u64,
    pub flush_slots_written: u64,
    pub flush_bytes_written: u64,
    pub flush_errors: u64,

    pub close_full_writes: u64,
}

pub fn record_claim_saved(memory_only: bool) {
    CLAIMS_SAVED.fetch_add(1, Ordering::Relaxed);
    if memory_only {
        CLAIMS_SAVED_MEMORY_ONLY.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn record_claim_rejected() {
    CLAIMS_REJECTED.fetch_add(1, Ordering::Relaxed);
}

/// slots == 0 marks a full-buffer flush.
pub fn record_flush(slots: u64, bytes: u64) {
    FLUSHES_COMPLETED.fetch_add(1, Ordering::Relaxed);
    FLUSH_SLOTS_WRITTEN.fetch_add(slots, Ordering::Relaxed);
    FLUSH_BYTES_WRITTEN.fetch_add(bytes, Ordering::Relaxed);
}

pub fn record_flush_error() {
    FLUSH_ERRORS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_close_full_write() {
    CLOSE_FULL_WRITES.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        claims_saved: CLAIMS_SAVED.load(Ordering::Relaxed),
        claims_saved_memory_only: CLAIMS_SAVED_MEMORY_ONLY.load(Ordering::Relaxed),
        claims_rejected: CLAIMS_REJECTED.load(Ordering::Relaxed),
        flushes_completed: FLUSHES_COMPLETED.load(Ordering::Relaxed),
        flush_slots_written: FLUSH_SLOTS_WRITTEN.load(Ordering::Relaxed),
        flush_bytes_written: FLUSH_BYTES_WRITTEN.load(Ordering::Relaxed),
        flush_errors: FLUSH_ERRORS.load(Ordering::Relaxed),
        close_full_writes: CLOSE_FULL_WRITES.load(Ordering::Relaxed),
    }
}
