//! Online log-template mining.
//!
//! Log lines are grouped into clusters that share a template: a token
//! sequence where variable positions are replaced by a wildcard marker. Each
//! cluster keeps an occurrence count, a few sample lines, and a volume series
//! bucketed to 10 seconds.
//!
//! # Architecture
//!
//! - `tree.rs`: depth-bounded prefix tree that shortlists candidate clusters
//! - `similarity.rs`: scoring, best-match selection, template generalization
//! - `store.rs`: capacity-bounded LRU store owning the cluster records
//! - `volume.rs`: sparse time-bucketed occurrence series
//! - `engine.rs`: the `Drain` train / match workflow
//!
//! ```rust
//! use drain::{Drain, DrainConfig};
//!
//! let mut drain = Drain::new(DrainConfig {
//!     similarity_threshold: 0.5,
//!     ..DrainConfig::default()
//! })?;
//! drain.train("user 1 logged in", 0)?;
//! let cluster = drain.train("user 2 logged in", 0)?;
//! assert_eq!(cluster.template(), "user <*> logged in");
//! assert_eq!(cluster.size(), 2);
//! # Ok::<(), drain::DrainError>(())
//! ```

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod similarity;
pub mod store;
pub mod tree;
pub mod volume;

pub use cluster::{Cluster, ClusterId, ClusterSummary, TemplateRenderer, MAX_SAMPLES};
pub use config::{DrainConfig, DEFAULT_PARAM_STRING};
pub use engine::{Drain, DrainStats};
pub use error::{DrainError, DrainResult};
pub use similarity::pinned;
pub use volume::{SamplePair, Volume, TIME_RESOLUTION_MS};
