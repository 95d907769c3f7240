// Streaming log-template miner built on the `drain` engine.

// Core infrastructure
pub mod conf;
pub mod error;

// Pipeline
pub mod prefix;
pub mod ingest;
pub mod report;
pub mod runtime;
