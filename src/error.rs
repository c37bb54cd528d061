use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run before any worker starts, or while saving results
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("thread count must be at least 1, got {0}")]
    InvalidThreadCount(usize),
    #[error("timeout must be greater than zero")]
    InvalidTimeout,
    #[error("invalid echo URL '{url}': {reason}")]
    InvalidEchoUrl { url: String, reason: String },
    #[error("failed to read proxy list {path:?}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write working proxies to {path:?}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
