//! Error types for the klog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for klog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error while writing to a backend
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Remote store dial, probe or command failure
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    /// Backend construction or configuration failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input that does not have the expected shape
    #[error("Format error: {0}")]
    Format(String),
}
