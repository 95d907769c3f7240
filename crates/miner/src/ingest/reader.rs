use std::borrow::Cow;

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::metrics::{DropReason, MinerMetrics};
use super::LogLine;
use crate::conf::MinerConfig;
use crate::error::{MinerError, MinerResult};
use crate::prefix::split_prefix;

/// Read `reader` to EOF, sending every usable line to `tx`.
///
/// Returns the number of lines sent. Fails on I/O errors or when the
/// receiving worker has gone away.
pub async fn read_lines<R>(
    mut reader: R,
    config: &MinerConfig,
    tx: mpsc::Sender<LogLine>,
    metrics: &MinerMetrics,
) -> MinerResult<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut sent = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        metrics.record_read();

        let Some(line) = prepare(&buf, config, metrics) else {
            continue;
        };
        tx.send(line)
            .await
            .map_err(|_| MinerError::Worker("line channel closed".to_string()))?;
        sent += 1;
    }

    debug!(sent, "Reached end of input");
    Ok(sent)
}

/// Turn one raw line into a [`LogLine`], or `None` if it should be dropped.
fn prepare(raw: &[u8], config: &MinerConfig, metrics: &MinerMetrics) -> Option<LogLine> {
    let raw = trim_newline(raw);
    if raw.len() > config.max_line_size {
        warn!(
            size = raw.len(),
            limit = config.max_line_size,
            "Dropping oversized line"
        );
        metrics.record_dropped(DropReason::TooLarge);
        return None;
    }

    let text = String::from_utf8_lossy(raw);
    if matches!(text, Cow::Owned(_)) {
        metrics.record_non_utf8();
    }

    let (message, timestamp) = if config.strip_prefix {
        let split = split_prefix(&text);
        (split.message, split.timestamp)
    } else {
        (text.as_ref(), None)
    };

    let message = message.trim();
    if message.is_empty() {
        metrics.record_dropped(DropReason::Empty);
        return None;
    }

    let timestamp = match timestamp {
        Some(ts) => {
            metrics.record_timestamp_parsed();
            ts
        }
        None => Utc::now(),
    };
    Some(LogLine::new(message, timestamp))
}

fn trim_newline(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}
