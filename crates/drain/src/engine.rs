//! The `Drain` engine: tokenize, shortlist through the prefix tree, score,
//! then either generalize the matched cluster or create a new one.
//!
//! The engine is a plain synchronous data structure. Training takes
//! `&mut self`; lookups take `&self` and leave tree, store and clusters
//! untouched. Callers that share an engine across tasks must serialize access
//! themselves.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::cluster::{Cluster, ClusterId, TemplateRenderer};
use crate::config::DrainConfig;
use crate::error::{DrainError, DrainResult};
use crate::similarity::{create_template, fast_match};
use crate::store::ClusterStore;
use crate::tree::PrefixTree;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// Running counters for one engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainStats {
    pub lines_trained: u64,
    pub clusters_created: u64,
    pub clusters_evicted: u64,
    /// Lines that joined an already existing cluster.
    pub lines_matched: u64,
}

#[derive(Debug)]
pub struct Drain {
    config: DrainConfig,
    tree: PrefixTree,
    store: ClusterStore,
    clusters_counter: ClusterId,
    stats: DrainStats,
}

impl Drain {
    pub fn new(config: DrainConfig) -> DrainResult<Self> {
        config.validate()?;
        Ok(Self {
            tree: PrefixTree::new(
                config.max_node_depth(),
                config.max_children,
                config.param_string.clone(),
            ),
            store: ClusterStore::new(config.max_clusters),
            clusters_counter: 0,
            stats: DrainStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &DrainConfig {
        &self.config
    }

    pub fn stats(&self) -> DrainStats {
        self.stats
    }

    /// Number of live clusters.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Split `content` with the default tokenizer.
    ///
    /// Leading and trailing whitespace is trimmed, every extra delimiter is
    /// replaced by a space, then the text is split on single spaces. Runs of
    /// spaces therefore produce empty tokens.
    pub fn tokenize(&self, content: &str) -> Vec<String> {
        let mut content = content.trim().to_string();
        for delimiter in &self.config.extra_delimiters {
            if !delimiter.is_empty() {
                content = content.replace(delimiter.as_str(), " ");
            }
        }
        content.split(' ').map(String::from).collect()
    }

    /// Train on one raw line observed at `ts` (Unix nanoseconds).
    pub fn train(&mut self, content: &str, ts: i64) -> DrainResult<&Cluster> {
        let tokens = self.tokenize(content);
        self.train_tokens(content, tokens, None, ts)
    }

    /// Train on caller-supplied tokens, bypassing the default tokenizer.
    ///
    /// `renderer` is attached to the cluster only if this line creates it.
    pub fn train_tokens(
        &mut self,
        content: &str,
        tokens: Vec<String>,
        renderer: Option<Arc<dyn TemplateRenderer>>,
        ts: i64,
    ) -> DrainResult<&Cluster> {
        let ts_ms = ts / NANOS_PER_MILLI;

        let matched = self.search_and_touch(&tokens)?;
        self.stats.lines_trained += 1;
        match matched {
            Some(id) => self.update_cluster(id, content, &tokens, ts_ms),
            None => self.create_cluster(content, tokens, renderer, ts_ms),
        }
    }

    /// Find the cluster that exactly covers `content`, counting wildcard
    /// positions as matches. Never creates or modifies anything.
    pub fn match_content(&self, content: &str) -> DrainResult<Option<&Cluster>> {
        self.match_tokens(&self.tokenize(content))
    }

    /// Same as [`Drain::match_content`] for caller-supplied tokens.
    pub fn match_tokens(&self, tokens: &[String]) -> DrainResult<Option<&Cluster>> {
        let Some(ids) = self.tree.search(tokens) else {
            return Ok(None);
        };
        if tokens.is_empty() {
            return Ok(ids.iter().find_map(|&id| self.store.peek(id)));
        }

        let candidates = ids.iter().filter_map(|&id| self.store.peek(id));
        fast_match(candidates, tokens, &self.config.param_string, 1.0, true)
    }

    /// Live clusters, least recently used first.
    pub fn clusters(&self) -> Vec<&Cluster> {
        self.store.iter().collect()
    }

    /// Visit live clusters in store order until `f` returns false.
    pub fn iterate<F>(&self, mut f: F)
    where
        F: FnMut(&Cluster) -> bool,
    {
        for cluster in self.store.iter() {
            if !f(cluster) {
                return;
            }
        }
    }

    /// Tree lookup plus scoring for training. Every live candidate is touched
    /// in the store, the same as a regular cache read.
    fn search_and_touch(&mut self, tokens: &[String]) -> DrainResult<Option<ClusterId>> {
        let Some(ids) = self.tree.search(tokens) else {
            return Ok(None);
        };

        if tokens.is_empty() {
            return Ok(ids.iter().copied().find(|&id| self.store.touch(id)));
        }

        let live: Vec<ClusterId> = ids.iter().copied().filter(|&id| self.store.touch(id)).collect();
        let candidates = live.iter().filter_map(|&id| self.store.peek(id));
        let best = fast_match(
            candidates,
            tokens,
            &self.config.param_string,
            self.config.similarity_threshold,
            false,
        )?;
        Ok(best.map(Cluster::id))
    }

    fn create_cluster(
        &mut self,
        content: &str,
        tokens: Vec<String>,
        renderer: Option<Arc<dyn TemplateRenderer>>,
        ts_ms: i64,
    ) -> DrainResult<&Cluster> {
        self.clusters_counter += 1;
        let id = self.clusters_counter;
        self.stats.clusters_created += 1;

        let cluster = Cluster::new(id, content, tokens.clone(), renderer, ts_ms);
        if let Some(evicted) = self.store.insert(cluster) {
            self.stats.clusters_evicted += 1;
            debug!(
                cluster_id = evicted.id(),
                size = evicted.size(),
                "drain: evicted least recently used cluster"
            );
        }

        // Surviving siblings are read through the store, which makes them
        // more recent than the cluster just created.
        self.tree.insert(&tokens, id, |candidate| self.store.touch(candidate));
        debug!(cluster_id = id, tokens = tokens.len(), "drain: created cluster");

        // The newest entry is never the eviction victim.
        self.store.peek(id).ok_or(DrainError::MissingCluster(id))
    }

    fn update_cluster(
        &mut self,
        id: ClusterId,
        content: &str,
        tokens: &[String],
        ts_ms: i64,
    ) -> DrainResult<&Cluster> {
        let param = self.config.param_string.as_str();
        let cluster = self
            .store
            .get_mut(id)
            .ok_or(DrainError::MissingCluster(id))?;

        let template = create_template(cluster.tokens(), tokens, param)?;
        cluster.set_tokens(template);
        cluster.append(content, ts_ms);
        self.stats.lines_matched += 1;
        trace!(cluster_id = id, size = cluster.size(), "drain: matched cluster");
        Ok(&*cluster)
    }
}
