//! Report: end-of-run summary of the mined templates.

use std::fmt;

use drain::{ClusterSummary, Drain, DrainStats};
use serde::Serialize;

use crate::conf::OutputFormat;
use crate::error::MinerResult;
use crate::ingest::MetricsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Clusters alive at the end of the run, before `top` is applied.
    pub total_clusters: usize,
    /// Largest clusters first; ties broken by id.
    pub clusters: Vec<ClusterSummary>,
    pub engine: DrainStats,
    pub metrics: MetricsSnapshot,
}

impl Report {
    /// Summarize `drain`, keeping the `top` largest clusters (all when 0).
    pub fn build(drain: &Drain, metrics: MetricsSnapshot, top: usize) -> Self {
        let mut clusters = drain.clusters();
        clusters.sort_by(|a, b| b.size().cmp(&a.size()).then(a.id().cmp(&b.id())));

        let limit = if top == 0 { clusters.len() } else { top };
        Self {
            total_clusters: clusters.len(),
            clusters: clusters.iter().take(limit).map(|c| c.summary()).collect(),
            engine: drain.stats(),
            metrics,
        }
    }

    pub fn render(&self, format: OutputFormat) -> MinerResult<String> {
        match format {
            OutputFormat::Text => Ok(self.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} clusters ({} shown)",
            self.total_clusters,
            self.clusters.len()
        )?;
        writeln!(f, "{:>10}  {:>6}  TEMPLATE", "COUNT", "ID")?;
        for cluster in &self.clusters {
            writeln!(f, "{:>10}  {:>6}  {}", cluster.size, cluster.id, cluster.template)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "engine: trained={} matched={} created={} evicted={}",
            self.engine.lines_trained,
            self.engine.lines_matched,
            self.engine.clusters_created,
            self.engine.clusters_evicted
        )?;
        write!(
            f,
            "input: read={} dropped={} (too_large={} empty={}) non_utf8={} timestamps={} errors={}",
            self.metrics.lines_read,
            self.metrics.lines_dropped,
            self.metrics.lines_too_large,
            self.metrics.lines_empty,
            self.metrics.non_utf8,
            self.metrics.timestamps_parsed,
            self.metrics.train_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drain::DrainConfig;

    fn trained(lines: &[&str]) -> Drain {
        let mut drain = Drain::new(DrainConfig::default()).unwrap();
        for line in lines {
            drain.train(line, 0).unwrap();
        }
        drain
    }

    fn sample_drain() -> Drain {
        trained(&[
            "connection reset by peer",
            "user 1 logged in",
            "user 2 logged in",
            "user 3 logged in",
            "disk sda full",
            "disk sdb full",
        ])
    }

    // ─── Build ──────────────────────────────────────────────────

    #[test]
    fn test_sorted_by_size_then_id() {
        let report = Report::build(&sample_drain(), MetricsSnapshot::default(), 0);

        let order: Vec<(u64, &str)> = report
            .clusters
            .iter()
            .map(|c| (c.size, c.template.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (3, "user <*> logged in"),
                (2, "disk <*> full"),
                (1, "connection reset by peer"),
            ]
        );
        assert_eq!(report.total_clusters, 3);
    }

    #[test]
    fn test_equal_sizes_keep_id_order() {
        let report = Report::build(
            &trained(&["alpha beta gamma", "one two three four"]),
            MetricsSnapshot::default(),
            0,
        );
        let ids: Vec<u64> = report.clusters.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_top_limits_clusters() {
        let report = Report::build(&sample_drain(), MetricsSnapshot::default(), 1);
        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.total_clusters, 3);
        assert_eq!(report.engine.lines_trained, 6);
    }

    // ─── Render ─────────────────────────────────────────────────

    #[test]
    fn test_render_text() {
        let report = Report::build(&sample_drain(), MetricsSnapshot::default(), 2);
        let text = report.render(OutputFormat::Text).unwrap();

        assert!(text.starts_with("3 clusters (2 shown)\n"));
        assert!(text.contains("user <*> logged in"));
        assert!(!text.contains("connection reset by peer"));
        assert!(text.contains("engine: trained=6"));
    }

    #[test]
    fn test_render_json() {
        let report = Report::build(&sample_drain(), MetricsSnapshot::default(), 0);
        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(json["total_clusters"], 3);
        assert_eq!(json["clusters"][0]["template"], "user <*> logged in");
        assert_eq!(json["clusters"][0]["size"], 3);
        assert_eq!(json["engine"]["clusters_created"], 3);
        assert_eq!(json["metrics"]["lines_read"], 0);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::build(&trained(&[]), MetricsSnapshot::default(), 10);
        assert!(report.clusters.is_empty());
        assert!(report.to_string().starts_with("0 clusters (0 shown)"));
    }
}
