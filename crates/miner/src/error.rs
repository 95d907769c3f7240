use drain::DrainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template engine error: {0}")]
    Drain(#[from] DrainError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template worker stopped unexpectedly: {0}")]
    Worker(String),
}

pub type MinerResult<T> = Result<T, MinerError>;
