//! Sparse per-cluster occurrence history.
//!
//! Occurrences are bucketed to [`TIME_RESOLUTION_MS`] and kept as an ordered
//! list of `(bucket, count)` pairs. Bucket timestamps are Unix milliseconds,
//! strictly increasing, never duplicated. Almost every write lands in the
//! newest bucket, so that case is checked first.

use serde::{Deserialize, Serialize};

/// Bucket width: 10 seconds.
pub const TIME_RESOLUTION_MS: i64 = 10_000;

/// Initial capacity reserved for a fresh series.
const DEFAULT_VOLUME_SIZE: usize = 500;

/// Truncate a millisecond timestamp to the start of its bucket.
pub fn truncate_timestamp(ts: i64) -> i64 {
    ts - ts % TIME_RESOLUTION_MS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePair {
    pub timestamp: i64,
    pub count: u64,
}

impl SamplePair {
    fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            count: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    values: Vec<SamplePair>,
}

impl Volume {
    pub fn new() -> Self {
        Self::default()
    }

    /// A series holding one occurrence at `ts`.
    pub fn starting_at(ts: i64) -> Self {
        let mut values = Vec::with_capacity(DEFAULT_VOLUME_SIZE);
        values.push(SamplePair::new(truncate_timestamp(ts)));
        Self { values }
    }

    pub fn values(&self) -> &[SamplePair] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Timestamp of the oldest bucket.
    pub fn first(&self) -> Option<i64> {
        self.values.first().map(|p| p.timestamp)
    }

    /// Timestamp of the newest bucket.
    pub fn last(&self) -> Option<i64> {
        self.values.last().map(|p| p.timestamp)
    }

    /// Record one occurrence at `ts` (milliseconds).
    pub fn add(&mut self, ts: i64) {
        let t = truncate_timestamp(ts);
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            self.values.push(SamplePair::new(t));
            return;
        };

        if last == t {
            if let Some(newest) = self.values.last_mut() {
                newest.count += 1;
            }
        } else if first > t {
            self.values.insert(0, SamplePair::new(t));
        } else if last < t {
            self.values.push(SamplePair::new(t));
        } else {
            let index = self.values.partition_point(|p| p.timestamp < t);
            match self.values.get_mut(index) {
                Some(pair) if pair.timestamp == t => pair.count += 1,
                _ => self.values.insert(index, SamplePair::new(t)),
            }
        }
    }

    /// The buckets with timestamps in `[start, end)`.
    pub fn range(&self, start: i64, end: i64) -> Volume {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Volume::new();
        };
        if start >= end || first >= end || last < start {
            return Volume::new();
        }

        let lo = if start > first {
            self.values.partition_point(|p| p.timestamp < start)
        } else {
            0
        };
        let hi = if end <= last {
            self.values.partition_point(|p| p.timestamp < end)
        } else {
            self.values.len()
        };

        Volume {
            values: self.values[lo..hi].to_vec(),
        }
    }

    /// Total occurrences across all buckets.
    pub fn total_count(&self) -> u64 {
        self.values.iter().map(|p| p.count).sum()
    }
}
