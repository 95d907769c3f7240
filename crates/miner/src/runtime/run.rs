//! Run: wire the reader, the template worker and the report together.

use std::future::Future;
use std::sync::Arc;

use drain::Drain;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::conf::MinerConfig;
use crate::error::{MinerError, MinerResult};
use crate::ingest::{read_lines, MinerMetrics, TemplateWorker};
use crate::report::Report;
use crate::runtime::stop::shutdown_signal;

/// Mine the configured input and print the report to stdout.
pub async fn run(config: MinerConfig) -> MinerResult<()> {
    let report = match &config.input_path {
        Some(path) => {
            info!("Reading log lines from {}", path);
            let file = File::open(path).await?;
            mine_until(BufReader::new(file), &config, shutdown_signal()).await?
        }
        None => {
            info!("Reading log lines from stdin");
            mine_until(BufReader::new(tokio::io::stdin()), &config, shutdown_signal()).await?
        }
    };

    let rendered = report.render(config.output)?;
    let mut stdout = tokio::io::stdout();
    stdout.write_all(rendered.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

/// Mine `reader` to EOF.
pub async fn mine<R>(reader: R, config: &MinerConfig) -> MinerResult<Report>
where
    R: AsyncBufRead + Unpin,
{
    mine_until(reader, config, std::future::pending()).await
}

/// Mine `reader` until EOF or until `shutdown` resolves, whichever comes
/// first. Lines already queued are still trained before the report is built.
pub async fn mine_until<R, S>(reader: R, config: &MinerConfig, shutdown: S) -> MinerResult<Report>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let drain = Drain::new(config.drain.clone())?;
    let metrics = Arc::new(MinerMetrics::new());
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let worker = tokio::spawn(TemplateWorker::new(drain, Arc::clone(&metrics)).run(rx));

    let read = tokio::select! {
        biased;
        _ = shutdown => {
            info!("Stopped reading before end of input");
            Ok(0)
        }
        result = read_lines(reader, config, tx, &metrics) => result,
    };

    // All senders are gone once the select completes, so the worker finishes.
    let drain = worker
        .await
        .map_err(|e| MinerError::Worker(e.to_string()))?;
    read?;

    let report = Report::build(&drain, metrics.snapshot(), config.top);
    info!(
        "Mining complete: lines={}, clusters={}",
        report.metrics.lines_trained, report.total_clusters
    );
    Ok(report)
}
