use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Why a line never reached the template engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Line exceeded `max_line_size`
    TooLarge,
    /// Nothing left after trimming
    Empty,
}

/// Counters shared between the reader and the template worker.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` reads are not
/// transactional across fields.
#[derive(Debug, Default)]
pub struct MinerMetrics {
    lines_read: AtomicU64,
    lines_trained: AtomicU64,
    lines_too_large: AtomicU64,
    lines_empty: AtomicU64,
    non_utf8: AtomicU64,
    timestamps_parsed: AtomicU64,
    train_errors: AtomicU64,
}

impl MinerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self, reason: DropReason) {
        match reason {
            DropReason::TooLarge => self.lines_too_large.fetch_add(1, Ordering::Relaxed),
            DropReason::Empty => self.lines_empty.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Line was not valid UTF-8 and was decoded lossily.
    #[inline]
    pub fn record_non_utf8(&self) {
        self.non_utf8.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_timestamp_parsed(&self) {
        self.timestamps_parsed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_trained(&self) {
        self.lines_trained.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_train_error(&self) {
        self.train_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let lines_too_large = self.lines_too_large.load(Ordering::Relaxed);
        let lines_empty = self.lines_empty.load(Ordering::Relaxed);

        MetricsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            lines_trained: self.lines_trained.load(Ordering::Relaxed),
            lines_dropped: lines_too_large + lines_empty,
            lines_too_large,
            lines_empty,
            non_utf8: self.non_utf8.load(Ordering::Relaxed),
            timestamps_parsed: self.timestamps_parsed.load(Ordering::Relaxed),
            train_errors: self.train_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`MinerMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub lines_trained: u64,
    pub lines_dropped: u64,
    pub lines_too_large: u64,
    pub lines_empty: u64,
    pub non_utf8: u64,
    pub timestamps_parsed: u64,
    pub train_errors: u64,
}
