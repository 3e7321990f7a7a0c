//! Output backends.
//!
//! A logger owns exactly one backend at a time. Every backend accepts a fully
//! formatted byte sequence and reports how many bytes it consumed:
//! - `Console` writes to stdout (or a stand-in writer)
//! - `File` appends to a file under an exclusive advisory lock
//! - `RemoteStore` adds each message to a sorted set keyed by severity label

use crate::{Error, Result};
use chrono::Utc;
use fs2::FileExt;
use redis::IntoConnectionInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which backend a logger currently writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Console,
    File,
    RemoteStore,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Console => "console",
            BackendKind::File => "file",
            BackendKind::RemoteStore => "store",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" | "stdout" => Ok(BackendKind::Console),
            "file" => Ok(BackendKind::File),
            "store" | "redis" | "remote_store" => Ok(BackendKind::RemoteStore),
            other => Err(Error::Format(format!("unknown backend '{}'", other))),
        }
    }
}

// ============================================================================
// Console
// ============================================================================

/// Writes to the process's standard output
pub struct ConsoleBackend {
    out: Box<dyn Write + Send>,
}

impl ConsoleBackend {
    pub fn stdout() -> Self {
        Self {
            out: Box::new(io::stdout()),
        }
    }

    /// Use another writer in place of stdout (e.g. an in-memory buffer)
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.out.write_all(bytes)?;
        self.out.flush()?;
        Ok(bytes.len())
    }
}

// ============================================================================
// File
// ============================================================================

/// Appends to a log file, never truncating it
pub struct FileBackend {
    path: PathBuf,
    file: File,
}

impl FileBackend {
    /// Open (or create) the file for appending with mode 0644
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.create(true).append(true).read(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let file = options.open(path).map_err(|e| {
            Error::Config(format!("Failed to open log file {:?}: {}", path, e))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The exclusive lock keeps records from several
    /// processes sharing the file from interleaving.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.file.lock_exclusive()?;
        let written = self.file.write_all(bytes);
        let unlocked = FileExt::unlock(&self.file);
        written?;
        unlocked?;
        Ok(bytes.len())
    }

    /// Flush to disk and release the handle
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        tracing::debug!("Closed log file {:?}", self.path);
        Ok(())
    }
}

// ============================================================================
// Remote sorted-set store
// ============================================================================

/// The two store operations the remote backend relies on
pub trait SortedSetStore: Send {
    /// Round trip confirming the connection is usable
    fn ping(&mut self) -> Result<()>;

    /// Add `member` to the sorted set `key` with `score`
    fn zadd(&mut self, key: &str, member: &str, score: i64) -> Result<()>;
}

impl SortedSetStore for redis::Connection {
    fn ping(&mut self) -> Result<()> {
        redis::cmd("PING").query::<String>(self)?;
        Ok(())
    }

    fn zadd(&mut self, key: &str, member: &str, score: i64) -> Result<()> {
        redis::cmd("ZADD")
            .arg(key)
            .arg(score)
            .arg(member)
            .query::<i64>(self)?;
        Ok(())
    }
}

/// Sends each message to a sorted set named after its severity label,
/// scored by Unix time in seconds
pub struct RemoteStoreBackend {
    addr: String,
    password: Option<String>,
    db: i64,
    store: Box<dyn SortedSetStore>,
}

impl RemoteStoreBackend {
    /// Dial a Redis server and probe it with PING.
    ///
    /// `addr` is either `host:port` or a full `redis://` URL. An empty
    /// password and db 0 leave the URL's own settings alone.
    pub fn connect(addr: &str, password: Option<&str>, db: i64) -> Result<Self> {
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        };
        let mut info = url
            .as_str()
            .into_connection_info()
            .map_err(|e| Error::Config(format!("Invalid store address '{}': {}", addr, e)))?;

        let password = password.filter(|p| !p.is_empty()).map(str::to_string);
        if password.is_some() {
            info.redis.password = password.clone();
        }
        if db != 0 {
            info.redis.db = db;
        }

        let client = redis::Client::open(info)
            .map_err(|e| Error::Config(format!("Invalid store address '{}': {}", addr, e)))?;
        let connection = client
            .get_connection()
            .map_err(|e| Error::Config(format!("Failed to connect to store at {}: {}", addr, e)))?;

        let mut backend = Self::with_store(Box::new(connection))?;
        backend.addr = addr.to_string();
        backend.password = password;
        backend.db = db;
        tracing::debug!("Connected to log store at {} (db {})", addr, db);
        Ok(backend)
    }

    /// Wrap an already connected store. The store must answer a ping.
    pub fn with_store(mut store: Box<dyn SortedSetStore>) -> Result<Self> {
        store
            .ping()
            .map_err(|e| Error::Config(format!("Store did not answer ping: {}", e)))?;
        Ok(Self {
            addr: String::new(),
            password: None,
            db: 0,
            store,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn db(&self) -> i64 {
        self.db
    }

    /// Expects `<label>\t<message>`. Only the first tab splits, so the
    /// message itself may contain tabs.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::Format(format!("store record is not UTF-8: {}", e)))?;
        let (key, member) = text.split_once('\t').ok_or_else(|| {
            Error::Format(format!("store record has no tab separator: {:?}", text))
        })?;

        self.store.zadd(key, member, Utc::now().timestamp())?;
        Ok(bytes.len())
    }
}

// ============================================================================
// Backend
// ============================================================================

/// The active output of a logger
pub enum Backend {
    Console(ConsoleBackend),
    File(FileBackend),
    RemoteStore(RemoteStoreBackend),
}

impl Backend {
    pub fn console() -> Self {
        Backend::Console(ConsoleBackend::stdout())
    }

    /// Build a backend from its kind and connection string: ignored for
    /// console, a path for file, an address for the store (no password, db 0)
    pub fn open(kind: BackendKind, connection: &str) -> Result<Self> {
        match kind {
            BackendKind::Console => Ok(Backend::console()),
            BackendKind::File => Ok(Backend::File(FileBackend::open(connection)?)),
            BackendKind::RemoteStore => Ok(Backend::RemoteStore(RemoteStoreBackend::connect(
                connection, None, 0,
            )?)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Console(_) => BackendKind::Console,
            Backend::File(_) => BackendKind::File,
            Backend::RemoteStore(_) => BackendKind::RemoteStore,
        }
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        match self {
            Backend::Console(b) => b.write(bytes),
            Backend::File(b) => b.write(bytes),
            Backend::RemoteStore(b) => b.write(bytes),
        }
    }

    /// Release the underlying resource
    pub fn close(self) -> Result<()> {
        match self {
            Backend::Console(mut b) => {
                b.out.flush()?;
                Ok(())
            }
            Backend::File(b) => b.close(),
            Backend::RemoteStore(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Console(_) => f.write_str("Console"),
            Backend::File(b) => f.debug_tuple("File").field(&b.path()).finish(),
            Backend::RemoteStore(b) => f
                .debug_struct("RemoteStore")
                .field("addr", &b.addr())
                .field("has_password", &b.password().is_some())
                .field("db", &b.db())
                .finish(),
        }
    }
}
