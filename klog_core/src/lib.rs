#![forbid(unsafe_code)]

//! Leveled logging with pluggable output backends.
//!
//! This crate provides:
//! - Severity levels with display labels and colors
//! - Format flags controlling date, time, caller and color decoration
//! - Console, file and remote sorted-set store backends
//! - A thread-safe `Logger` and a lazily created default instance

#[macro_use]
mod macros;

pub mod level;
pub mod flags;
pub mod error;
pub mod backend;
pub mod formatter;
pub mod logger;
pub mod config;
pub mod diagnostics;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{Error, Result};
pub use level::Severity;
pub use flags::FormatFlags;
pub use backend::{
    Backend, BackendKind, ConsoleBackend, FileBackend, RemoteStoreBackend, SortedSetStore,
};
pub use formatter::Message;
pub use logger::{logger, Logger};
pub use config::{BackendConfig, Config};
