use std::sync::Arc;

use drain::Drain;
use tokio::sync::mpsc;
use tracing::{error, info, trace};

use super::metrics::MinerMetrics;
use super::LogLine;

/// Owns the template engine and trains it one line at a time.
///
/// The engine is not synchronized, so exactly one worker task holds it.
pub struct TemplateWorker {
    drain: Drain,
    metrics: Arc<MinerMetrics>,
}

impl TemplateWorker {
    pub fn new(drain: Drain, metrics: Arc<MinerMetrics>) -> Self {
        Self { drain, metrics }
    }

    /// Train on one line. Engine errors are logged and counted; the line is
    /// skipped.
    pub fn process(&mut self, line: &LogLine) {
        match self.drain.train(&line.content, line.timestamp_nanos()) {
            Ok(cluster) => {
                self.metrics.record_trained();
                trace!(cluster_id = cluster.id(), size = cluster.size(), "Line trained");
            }
            Err(e) => {
                error!(error = %e, "Failed to train line");
                self.metrics.record_train_error();
            }
        }
    }

    /// Drain `rx` until every sender is dropped, then hand back the engine.
    pub async fn run(mut self, mut rx: mpsc::Receiver<LogLine>) -> Drain {
        while let Some(line) = rx.recv().await {
            self.process(&line);
        }

        let stats = self.drain.stats();
        info!(
            clusters = self.drain.len(),
            lines = stats.lines_trained,
            evicted = stats.clusters_evicted,
            "Template worker finished"
        );
        self.drain
    }

    #[cfg(test)]
    fn drain(&self) -> &Drain {
        &self.drain
    }
}
