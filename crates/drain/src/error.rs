use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrainError {
    /// Rejected at construction time; the engine is never built.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two token sequences that share a tree branch must have equal length.
    /// Only reachable through caller-supplied tokens that break that contract.
    #[error("Token length mismatch: template has {template} tokens, input has {input}")]
    TokenLengthMismatch { template: usize, input: usize },

    /// A cluster the engine just selected or created is not in the store.
    #[error("Internal invariant violated: cluster {0} missing from store")]
    MissingCluster(u64),
}

pub type DrainResult<T> = Result<T, DrainError>;
