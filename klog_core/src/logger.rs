//! The logger: configuration, level gating and serialized writes.
//!
//! Formatting runs outside the backend lock on a snapshot of the settings.
//! Only the backend write (and backend replacement) happens under the lock,
//! so records from concurrent callers never interleave.

use crate::formatter::{self, Message, Settings};
use crate::{Backend, BackendKind, Config, FormatFlags, Result, Severity};
use chrono::Local;
use once_cell::sync::Lazy;
use std::fmt;
use std::panic::Location;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULT_LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// The process-wide default logger, created on first use
pub fn logger() -> &'static Logger {
    &DEFAULT_LOGGER
}

struct State {
    settings: Settings,
    kind: BackendKind,
}

/// A leveled logger writing to one backend
pub struct Logger {
    state: RwLock<State>,
    backend: Mutex<Backend>,
}

/// Color is on by default only for an interactive terminal on platforms
/// whose default terminal understands ANSI escapes
fn detect_color() -> bool {
    !cfg!(windows) && yansi::Condition::stdout_is_tty()
}

impl Logger {
    /// Info level, console backend, standard flags, no prefix
    pub fn new() -> Self {
        Self::with_backend(Backend::console())
    }

    /// Same defaults as [`Logger::new`] around the given backend
    pub fn with_backend(backend: Backend) -> Self {
        let kind = backend.kind();
        Self {
            state: RwLock::new(State {
                settings: Settings {
                    level: Severity::Info,
                    flags: FormatFlags::STANDARD,
                    prefix: String::new(),
                    color_enabled: detect_color(),
                },
                kind,
            }),
            backend: Mutex::new(backend),
        }
    }

    /// Build a logger from a programmatic configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let logger = Self::with_backend(config.backend.open()?);
        logger
            .set_level(config.level)
            .set_flags(config.flags)
            .set_prefix(config.prefix.clone());
        if let Some(color) = config.color {
            logger.set_color_enabled(color);
        }
        Ok(logger)
    }

    fn state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Backend selection
    // ------------------------------------------------------------------

    /// Switch to a new backend. The new backend is built first; if that
    /// fails the current one stays active and the error is returned.
    pub fn set_backend(&self, kind: BackendKind, connection: &str) -> Result<()> {
        let backend = Backend::open(kind, connection)?;
        self.replace_backend(backend);
        Ok(())
    }

    /// Switch to a remote store with an explicit password and db index
    pub fn set_remote_store(&self, addr: &str, password: Option<&str>, db: i64) -> Result<()> {
        let backend = crate::RemoteStoreBackend::connect(addr, password, db)?;
        self.replace_backend(Backend::RemoteStore(backend));
        Ok(())
    }

    /// Install an already constructed backend and close the previous one
    pub fn replace_backend(&self, backend: Backend) {
        let kind = backend.kind();
        let previous = {
            let mut current = self.backend();
            let previous = std::mem::replace(&mut *current, backend);
            self.state_mut().kind = kind;
            previous
        };

        let previous_kind = previous.kind();
        if let Err(e) = previous.close() {
            tracing::warn!("Failed to close {} log backend: {}", previous_kind, e);
        }
        tracing::debug!("Switched log backend from {} to {}", previous_kind, kind);
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.state().kind
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn set_prefix(&self, prefix: impl Into<String>) -> &Self {
        self.state_mut().settings.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> String {
        self.state().settings.prefix.clone()
    }

    /// Change what is decorated around each message
    pub fn set_flags(&self, flags: FormatFlags) -> &Self {
        self.state_mut().settings.flags = flags;
        self
    }

    pub fn flags(&self) -> FormatFlags {
        self.state().settings.flags
    }

    /// Messages below `level` are dropped
    pub fn set_level(&self, level: Severity) -> &Self {
        self.state_mut().settings.level = level;
        self
    }

    pub fn level(&self) -> Severity {
        self.state().settings.level
    }

    /// Override terminal color detection
    pub fn set_color_enabled(&self, enabled: bool) -> &Self {
        self.state_mut().settings.color_enabled = enabled;
        self
    }

    pub fn color_enabled(&self) -> bool {
        self.state().settings.color_enabled
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    /// Format and write one record, reporting write failures.
    ///
    /// Returns `Ok(0)` without formatting anything when `severity` is below
    /// the logger's level. Never exits, even for `Severity::Fatal`.
    #[track_caller]
    pub fn log(&self, severity: Severity, message: Message<'_>) -> Result<usize> {
        self.log_at(severity, message, Some(Location::caller()))
    }

    /// Like [`Logger::log`] with an explicit caller location; `None` is
    /// rendered as `<unknown>:-1` when caller locations are shown.
    pub fn log_at(
        &self,
        severity: Severity,
        message: Message<'_>,
        location: Option<&Location<'_>>,
    ) -> Result<usize> {
        let (settings, kind) = {
            let state = self.state();
            if severity < state.settings.level {
                return Ok(0);
            }
            (state.settings.clone(), state.kind)
        };

        let record =
            formatter::format_record(&settings, kind, severity, &message, location, Local::now());

        self.backend().write(record.as_bytes())
    }

    #[track_caller]
    fn emit(&self, severity: Severity, message: Message<'_>) {
        if let Err(e) = self.log_at(severity, message, Some(Location::caller())) {
            tracing::warn!("Failed to write {} record: {}", severity, e);
        }
    }

    #[track_caller]
    pub fn debug(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Debug, Message::Values(values));
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Debug, Message::Format(args));
    }

    #[track_caller]
    pub fn info(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Info, Message::Values(values));
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Info, Message::Format(args));
    }

    #[track_caller]
    pub fn warn(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Warning, Message::Values(values));
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Warning, Message::Format(args));
    }

    #[track_caller]
    pub fn error(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Error, Message::Values(values));
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Error, Message::Format(args));
    }

    /// Write a fatal record, then exit the process with status 1 whether
    /// or not the write succeeded
    #[track_caller]
    pub fn fatal(&self, values: &[&dyn fmt::Display]) -> ! {
        self.emit(Severity::Fatal, Message::Values(values));
        std::process::exit(1)
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.emit(Severity::Fatal, Message::Format(args));
        std::process::exit(1)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Logger")
            .field("level", &state.settings.level)
            .field("flags", &state.settings.flags)
            .field("prefix", &state.settings.prefix)
            .field("color_enabled", &state.settings.color_enabled)
            .field("backend", &state.kind)
            .finish()
    }
}
