//! Model: MinerConfig and related types.

use std::fmt;
use std::str::FromStr;

use drain::DrainConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Log file to read; stdin when unset.
    pub input_path: Option<String>,
    pub output: OutputFormat,
    /// Skip leading timestamps / brackets / `name |` prefixes before training,
    /// using a parsed timestamp as the line's event time.
    pub strip_prefix: bool,
    /// Lines longer than this (in bytes) are dropped.
    pub max_line_size: usize,
    /// Bound of the reader → worker queue.
    pub channel_capacity: usize,
    /// Number of clusters in the report; 0 prints all.
    pub top: usize,
    pub drain: DrainConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            output: OutputFormat::Text,
            strip_prefix: true,
            max_line_size: 1_048_576, // 1MB
            channel_capacity: 1024,
            top: 50,
            drain: DrainConfig::default(),
        }
    }
}
