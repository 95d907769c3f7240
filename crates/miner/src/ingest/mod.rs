//! Ingest: reading log lines and feeding them to the template engine.
//!
//! A reader task turns raw input into [`LogLine`]s and sends them over a
//! bounded channel to a single [`TemplateWorker`] that owns the engine.

pub mod metrics;
pub mod reader;
pub mod worker;

use chrono::{DateTime, Utc};

pub use metrics::{DropReason, MetricsSnapshot, MinerMetrics};
pub use reader::read_lines;
pub use worker::TemplateWorker;

/// One line ready for training.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// Message with any stripped prefix removed.
    pub content: String,
    /// Event time from the prefix, or ingestion time.
    pub timestamp: DateTime<Utc>,
}

impl LogLine {
    pub fn new(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            timestamp,
        }
    }

    /// Event time in Unix nanoseconds, saturating outside the representable range.
    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp.timestamp_nanos_opt().unwrap_or_else(|| {
            if self.timestamp.timestamp() < 0 {
                i64::MIN
            } else {
                i64::MAX
            }
        })
    }
}
