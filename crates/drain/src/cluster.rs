use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::volume::Volume;

/// Sequential cluster identifier, starting at 1.
pub type ClusterId = u64;

/// First-come sample buffer capacity.
pub const MAX_SAMPLES: usize = 10;

/// Turns a template's tokens into display text.
///
/// Implemented for any `Fn(&[String]) -> String`, so a closure can be passed
/// wherever a renderer is expected.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, tokens: &[String]) -> String;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&[String]) -> String + Send + Sync,
{
    fn render(&self, tokens: &[String]) -> String {
        self(tokens)
    }
}

/// A group of log lines sharing one template.
#[derive(Clone)]
pub struct Cluster {
    id: ClusterId,
    tokens: Vec<String>,
    size: u64,
    samples: Vec<String>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    volume: Volume,
}

impl Cluster {
    pub(crate) fn new(
        id: ClusterId,
        content: &str,
        tokens: Vec<String>,
        renderer: Option<Arc<dyn TemplateRenderer>>,
        ts_ms: i64,
    ) -> Self {
        Self {
            id,
            tokens,
            size: 1,
            samples: vec![content.to_string()],
            renderer,
            volume: Volume::starting_at(ts_ms),
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Template tokens; variable positions hold the wildcard marker.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of lines assigned to this cluster.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Render the template with the custom renderer, or join on spaces.
    pub fn template(&self) -> String {
        match &self.renderer {
            Some(renderer) => renderer.render(&self.tokens),
            None => self.tokens.join(" "),
        }
    }

    /// Serializable snapshot of this cluster.
    pub fn summary(&self) -> ClusterSummary {
        ClusterSummary {
            id: self.id,
            template: self.template(),
            tokens: self.tokens.clone(),
            size: self.size,
            samples: self.samples.clone(),
            volume: self.volume.clone(),
        }
    }

    pub(crate) fn set_tokens(&mut self, tokens: Vec<String>) {
        self.tokens = tokens;
    }

    /// Count one more line: bump the size, keep the sample while there is
    /// room, and record the occurrence time.
    pub(crate) fn append(&mut self, content: &str, ts_ms: i64) {
        self.size += 1;
        self.volume.add(ts_ms);
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(content.to_string());
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template())
    }
}

impl fmt::Debug for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("id", &self.id)
            .field("tokens", &self.tokens)
            .field("size", &self.size)
            .field("samples", &self.samples)
            .field("custom_renderer", &self.renderer.is_some())
            .field("volume", &self.volume)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub id: ClusterId,
    pub template: String,
    pub tokens: Vec<String>,
    pub size: u64,
    pub samples: Vec<String>,
    pub volume: Volume,
}
