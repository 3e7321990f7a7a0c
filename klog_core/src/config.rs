//! Programmatic logger configuration.
//!
//! `Config` is plain data. It derives serde so callers can embed it in their
//! own configuration, but this crate never reads configuration files.

use crate::{Backend, BackendKind, FileBackend, FormatFlags, RemoteStoreBackend, Result, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything needed to build a [`crate::Logger`]
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub level: Severity,

    #[serde(default)]
    pub flags: FormatFlags,

    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub backend: BackendConfig,

    /// Force color on or off; `None` keeps terminal detection
    #[serde(default)]
    pub color: Option<bool>,
}

/// Backend selection with its connection settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    #[default]
    Console,
    File {
        path: PathBuf,
    },
    RemoteStore {
        addr: String,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        db: i64,
    },
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Console => BackendKind::Console,
            BackendConfig::File { .. } => BackendKind::File,
            BackendConfig::RemoteStore { .. } => BackendKind::RemoteStore,
        }
    }

    /// Construct the backend this configuration describes
    pub fn open(&self) -> Result<Backend> {
        match self {
            BackendConfig::Console => Ok(Backend::console()),
            BackendConfig::File { path } => Ok(Backend::File(FileBackend::open(path)?)),
            BackendConfig::RemoteStore { addr, password, db } => Ok(Backend::RemoteStore(
                RemoteStoreBackend::connect(addr, password.as_deref(), *db)?,
            )),
        }
    }
}
