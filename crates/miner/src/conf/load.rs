//! Load: config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use drain::DrainConfig;

use super::model::{MinerConfig, OutputFormat};
use crate::error::MinerResult;

const DEFAULT_CONFIG_PATH: &str = "/etc/drain/miner.toml";

impl MinerConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> MinerResult<Self> {
        let config_path = std::env::var("MINER_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::from_env()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> MinerResult<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: MinerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Override settings from `lookup` (normally the process environment).
    /// Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(input) = lookup("MINER_INPUT") {
            self.input_path = Some(input);
        }
        if let Some(output) = lookup("MINER_OUTPUT").and_then(|s| s.parse::<OutputFormat>().ok()) {
            self.output = output;
        }
        if let Some(strip) = lookup("MINER_STRIP_PREFIX").and_then(|s| s.parse().ok()) {
            self.strip_prefix = strip;
        }
        if let Some(top) = lookup("MINER_TOP").and_then(|s| s.parse().ok()) {
            self.top = top;
        }
        apply_drain_overrides(&mut self.drain, &lookup);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_line_size == 0 {
            return Err("max_line_size must be > 0".to_string());
        }
        if self.channel_capacity == 0 {
            return Err("channel_capacity must be > 0".to_string());
        }
        if let Some(path) = &self.input_path {
            if path.is_empty() {
                return Err("input_path must not be empty when set".to_string());
            }
        }
        self.drain.validate().map_err(|e| e.to_string())?;
        Ok(())
    }
}

fn apply_drain_overrides(drain: &mut DrainConfig, lookup: &impl Fn(&str) -> Option<String>) {
    if let Some(depth) = lookup("MINER_DEPTH").and_then(|s| s.parse().ok()) {
        drain.depth = depth;
    }
    if let Some(threshold) = lookup("MINER_SIM_TH").and_then(|s| s.parse().ok()) {
        drain.similarity_threshold = threshold;
    }
    if let Some(max_children) = lookup("MINER_MAX_CHILDREN").and_then(|s| s.parse().ok()) {
        drain.max_children = max_children;
    }
    if let Some(max_clusters) = lookup("MINER_MAX_CLUSTERS").and_then(|s| s.parse().ok()) {
        drain.max_clusters = max_clusters;
    }
    if let Some(delimiters) = lookup("MINER_EXTRA_DELIMITERS") {
        drain.extra_delimiters = delimiters
            .split_whitespace()
            .map(String::from)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinerError;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn test_defaults_are_valid() {
        let config = MinerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.strip_prefix);
        assert_eq!(config.top, 50);
    }

    #[test]
    fn test_validate_zero_channel_capacity() {
        let config = MinerConfig {
            channel_capacity: 0,
            ..MinerConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("channel_capacity"));
    }

    #[test]
    fn test_validate_zero_max_line_size() {
        let config = MinerConfig {
            max_line_size: 0,
            ..MinerConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("max_line_size"));
    }

    #[test]
    fn test_validate_empty_input_path() {
        let config = MinerConfig {
            input_path: Some(String::new()),
            ..MinerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_propagates_drain_errors() {
        let mut config = MinerConfig::default();
        config.drain.depth = 1;
        assert!(config.validate().unwrap_err().contains("depth"));
    }

    // ── Overrides ───────────────────────────────────────────────

    #[test]
    fn test_overrides_apply() {
        let mut config = MinerConfig::default();
        config.apply_overrides(lookup_from(&[
            ("MINER_INPUT", "/var/log/app.log"),
            ("MINER_OUTPUT", "JSON"),
            ("MINER_STRIP_PREFIX", "false"),
            ("MINER_TOP", "5"),
            ("MINER_DEPTH", "6"),
            ("MINER_SIM_TH", "0.7"),
            ("MINER_MAX_CLUSTERS", "1000"),
            ("MINER_EXTRA_DELIMITERS", "= ,"),
        ]));

        assert_eq!(config.input_path.as_deref(), Some("/var/log/app.log"));
        assert_eq!(config.output, OutputFormat::Json);
        assert!(!config.strip_prefix);
        assert_eq!(config.top, 5);
        assert_eq!(config.drain.depth, 6);
        assert_eq!(config.drain.similarity_threshold, 0.7);
        assert_eq!(config.drain.max_clusters, 1000);
        assert_eq!(config.drain.extra_delimiters, vec!["=", ","]);
    }

    #[test]
    fn test_invalid_override_ignored() {
        let mut config = MinerConfig::default();
        config.apply_overrides(lookup_from(&[
            ("MINER_DEPTH", "deep"),
            ("MINER_OUTPUT", "yaml"),
        ]));
        assert_eq!(config.drain.depth, 4);
        assert_eq!(config.output, OutputFormat::Text);
    }

    // ── File loading ────────────────────────────────────────────

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("miner-conf-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
            output = "json"
            top = 3

            [drain]
            depth = 5
            similarity_threshold = 0.6
            param_string = "<VAR>"
            "#,
        )
        .unwrap();

        let config = MinerConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.top, 3);
        assert_eq!(config.drain.depth, 5);
        assert_eq!(config.drain.param_string, "<VAR>");
        assert_eq!(config.drain.max_children, 100);
        assert_eq!(config.channel_capacity, 1024);
    }

    #[test]
    fn test_from_file_missing() {
        let err = MinerConfig::from_file("/nonexistent/miner.toml").unwrap_err();
        assert!(matches!(err, MinerError::Io(_)));
    }

    #[test]
    fn test_from_file_malformed() {
        let path = std::env::temp_dir().join(format!("miner-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "top = \"many\"").unwrap();
        let err = MinerConfig::from_file(path.to_str().unwrap()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, MinerError::ConfigParse(_)));
    }
}
