//! In-memory stand-ins for stdout and the remote store.

use crate::backend::SortedSetStore;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Cloneable writer that records everything written through any clone
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<(Vec<u8>, usize)>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap().0).into_owned()
    }

    /// Number of `write` calls, not counting flushes
    pub fn write_calls(&self) -> usize {
        self.inner.lock().unwrap().1
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.0.extend_from_slice(buf);
        inner.1 += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sorted sets kept in memory, keyed like the remote store
#[derive(Clone, Default)]
pub struct MemoryStore {
    sets: Arc<Mutex<HashMap<String, Vec<(String, i64)>>>>,
    unreachable: bool,
}

impl MemoryStore {
    /// A store whose ping always fails
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// `(member, score)` pairs in insertion order
    pub fn entries(&self, key: &str) -> Vec<(String, i64)> {
        self.sets
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

impl SortedSetStore for MemoryStore {
    fn ping(&mut self) -> Result<()> {
        if self.unreachable {
            return Err(Error::Config("store unreachable".into()));
        }
        Ok(())
    }

    fn zadd(&mut self, key: &str, member: &str, score: i64) -> Result<()> {
        let mut sets = self.sets.lock().unwrap();
        let set = sets.entry(key.to_string()).or_default();
        set.retain(|(m, _)| m != member);
        set.push((member.to_string(), score));
        Ok(())
    }
}
