//! Depth-bounded prefix tree that shortlists candidate clusters.
//!
//! The root branches on the token count (as a decimal string). Below that,
//! each level is keyed by a literal token or by the wildcard marker, down to
//! `max_node_depth` levels or the end of the sequence, whichever comes first.
//! Frontier nodes hold the ids of the clusters filed under that path.
//!
//! The tree only stores ids. Clusters evicted from the store leave stale ids
//! behind; they are skipped by the engine and pruned on the next insertion
//! through the same frontier node.

use std::collections::HashMap;

use crate::cluster::ClusterId;

#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    cluster_ids: Vec<ClusterId>,
}

impl Node {
    fn prune_and_push(&mut self, id: ClusterId, mut is_live: impl FnMut(ClusterId) -> bool) {
        self.cluster_ids.retain(|&candidate| is_live(candidate));
        self.cluster_ids.push(id);
    }
}

#[derive(Debug)]
pub struct PrefixTree {
    root: Node,
    max_node_depth: usize,
    max_children: usize,
    param_string: String,
}

impl PrefixTree {
    pub fn new(max_node_depth: usize, max_children: usize, param_string: impl Into<String>) -> Self {
        Self {
            root: Node::default(),
            max_node_depth,
            max_children,
            param_string: param_string.into(),
        }
    }

    /// Number of tokens walked below the token-count branch.
    fn steps(&self, token_count: usize) -> usize {
        self.max_node_depth.min(token_count).saturating_sub(1)
    }

    /// Candidate ids for `tokens`, or `None` if no known path fits.
    ///
    /// For the empty sequence this is the list filed directly under the `"0"`
    /// branch.
    pub fn search(&self, tokens: &[String]) -> Option<&[ClusterId]> {
        let mut node = self.root.children.get(&tokens.len().to_string())?;

        for token in tokens.iter().take(self.steps(tokens.len())) {
            node = node
                .children
                .get(token)
                .or_else(|| node.children.get(&self.param_string))?;
        }

        Some(&node.cluster_ids)
    }

    /// File a freshly created cluster under the path for its tokens.
    ///
    /// `is_live` is asked once per id already filed at the frontier node and
    /// reports whether it still resolves in the cluster store; ids that don't
    /// are dropped before `id` is added.
    pub fn insert(&mut self, tokens: &[String], id: ClusterId, is_live: impl FnMut(ClusterId) -> bool) {
        let steps = self.steps(tokens.len());
        let max_children = self.max_children;
        let param = self.param_string.as_str();

        let mut node = self.root.children.entry(tokens.len().to_string()).or_default();

        for token in tokens.iter().take(steps) {
            let key = child_key(node, token, param, max_children);
            node = node.children.entry(key).or_default();
        }

        node.prune_and_push(id, is_live);
    }

    /// Total number of nodes below the root.
    #[cfg(test)]
    fn node_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            node.children.values().map(|child| 1 + count(child)).sum()
        }
        count(&self.root)
    }
}

/// Pick the child a token descends into during insertion.
///
/// Tokens that look variable (contain a numeric character) always share the
/// wildcard child. Other tokens get their own literal child until the node
/// fills up; the last free slot is reserved for the wildcard child, and once
/// the node is full new literals are routed into it.
fn child_key(node: &Node, token: &str, param: &str, max_children: usize) -> String {
    if node.children.contains_key(token) {
        return token.to_string();
    }
    if has_numbers(token) {
        return param.to_string();
    }

    let len = node.children.len();
    if node.children.contains_key(param) {
        if len < max_children {
            token.to_string()
        } else {
            param.to_string()
        }
    } else if len + 1 < max_children {
        token.to_string()
    } else if len + 1 == max_children {
        param.to_string()
    } else {
        // Unreachable while the reservation above holds; stay within the
        // existing children rather than growing past the limit.
        node.children
            .keys()
            .min()
            .cloned()
            .unwrap_or_else(|| param.to_string())
    }
}

fn has_numbers(token: &str) -> bool {
    token.chars().any(char::is_numeric)
}
