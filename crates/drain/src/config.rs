use serde::{Deserialize, Serialize};

use crate::error::{DrainError, DrainResult};

/// Smallest accepted `depth`: one level for the token count, one for the
/// first token, and at least one matching level below.
pub const MIN_DEPTH: usize = 3;

pub const DEFAULT_PARAM_STRING: &str = "<*>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Tree depth parameter. The number of tree levels walked below the
    /// token-count branch is `depth - 2`.
    pub depth: usize,
    /// Minimum similarity (0.0 - 1.0) for a line to join an existing cluster.
    pub similarity_threshold: f64,
    /// Upper bound on the children of any tree node.
    pub max_children: usize,
    /// Maximum number of live clusters; 0 means unbounded.
    pub max_clusters: usize,
    /// Extra strings replaced by a space before the default tokenizer splits.
    pub extra_delimiters: Vec<String>,
    /// Wildcard marker, used in templates and as the wildcard tree key.
    pub param_string: String,
}

impl DrainConfig {
    /// Validate configuration values
    pub fn validate(&self) -> DrainResult<()> {
        if self.depth < MIN_DEPTH {
            return Err(DrainError::InvalidConfig(format!(
                "depth must be at least {}, got {}",
                MIN_DEPTH, self.depth
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DrainError::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.max_children == 0 {
            return Err(DrainError::InvalidConfig(
                "max_children must be > 0".to_string(),
            ));
        }
        if self.param_string.is_empty() {
            return Err(DrainError::InvalidConfig(
                "param_string must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of tree levels walked below the token-count branch.
    pub fn max_node_depth(&self) -> usize {
        self.depth.saturating_sub(2)
    }
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            similarity_threshold: 0.4,
            max_children: 100,
            max_clusters: 0,
            extra_delimiters: Vec::new(),
            param_string: DEFAULT_PARAM_STRING.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn test_defaults_are_valid() {
        let config = DrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.depth, 4);
        assert_eq!(config.similarity_threshold, 0.4);
        assert_eq!(config.max_children, 100);
        assert_eq!(config.max_clusters, 0);
        assert_eq!(config.param_string, "<*>");
    }

    #[test]
    fn test_validate_depth_below_minimum() {
        let config = DrainConfig {
            depth: 2,
            ..DrainConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, DrainError::InvalidConfig(ref msg) if msg.contains("depth")));
    }

    #[test]
    fn test_validate_minimum_depth_ok() {
        let config = DrainConfig {
            depth: 3,
            ..DrainConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.max_node_depth(), 1);
    }

    #[test]
    fn test_validate_threshold_out_of_range() {
        for threshold in [-0.1, 1.5, f64::NAN] {
            let config = DrainConfig {
                similarity_threshold: threshold,
                ..DrainConfig::default()
            };
            assert!(config.validate().is_err(), "threshold {} accepted", threshold);
        }
    }

    #[test]
    fn test_validate_zero_max_children() {
        let config = DrainConfig {
            max_children: 0,
            ..DrainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_param_string() {
        let config = DrainConfig {
            param_string: String::new(),
            ..DrainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    // ── Deserialization ─────────────────────────────────────────

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: DrainConfig = toml::from_str(
            r#"
            depth = 5
            extra_delimiters = ["=", ","]
            "#,
        )
        .unwrap();
        assert_eq!(config.depth, 5);
        assert_eq!(config.max_node_depth(), 3);
        assert_eq!(config.extra_delimiters, vec!["=", ","]);
        assert_eq!(config.similarity_threshold, 0.4);
        assert_eq!(config.param_string, "<*>");
    }
}
