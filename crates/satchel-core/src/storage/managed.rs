//! Storage mediated by a sandboxed runtime's own persistence facility.
//!
//! Processes that run inside such a runtime may have no filesystem access at
//! all. The runtime advertises its facilities by name through a
//! [`ServiceRegistry`]; when both the basic and the persistence service are
//! present the [`ManagedServiceBackend`] stores entries through the
//! [`PersistenceService`] instead of the filesystem.
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Debug};
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use log::error;

use crate::kernel::error::Result;
use crate::storage::backend::StorageBackend;
use crate::storage::error::StorageSystemError;

/// Name under which a runtime advertises its basic service
pub const BASIC_SERVICE: &str = "satchel.BasicService";

/// Name under which a runtime advertises its persistence service
pub const PERSISTENCE_SERVICE: &str = "satchel.PersistenceService";

const BACKEND_NAME: &str = "managed";

/// Key/value persistence offered by a managed runtime
pub trait PersistenceService: Send + Sync + Debug {
    /// Base location the runtime scopes this application's keys under
    fn codebase(&self) -> &str;

    /// Fetch the contents stored under `key`; `NotFound` when absent
    fn get(&self, key: &str) -> io::Result<Vec<u8>>;

    /// Store `contents` under `key`, creating it when absent
    fn put(&self, key: &str, contents: &[u8]) -> io::Result<()>;

    /// Remove `key`, returning whether it existed
    fn delete(&self, key: &str) -> io::Result<bool>;
}

/// Services advertised by the hosting runtime.
///
/// An empty registry is what an ordinary desktop process sees.
#[derive(Debug, Default, Clone)]
pub struct ServiceRegistry {
    names: BTreeSet<String>,
    persistence: Option<Arc<dyn PersistenceService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise a service name without an implementation behind it
    pub fn advertise(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Install a persistence service and advertise it
    pub fn install_persistence(&mut self, service: Arc<dyn PersistenceService>) {
        self.names.insert(PERSISTENCE_SERVICE.to_string());
        self.persistence = Some(service);
    }

    pub fn service_names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// The persistence service, if the runtime offers everything the managed
    /// backend needs. Looking it up has no side effects.
    pub fn lookup_persistence(&self) -> Option<Arc<dyn PersistenceService>> {
        let basic_found = self.names.contains(BASIC_SERVICE);
        let persistence_found = self.names.contains(PERSISTENCE_SERVICE);
        if basic_found && persistence_found {
            self.persistence.clone()
        } else {
            None
        }
    }
}

/// Backend storing entries through a [`PersistenceService`]
#[derive(Debug, Clone)]
pub struct ManagedServiceBackend {
    service: Arc<dyn PersistenceService>,
}

impl ManagedServiceBackend {
    pub fn new(service: Arc<dyn PersistenceService>) -> Self {
        Self { service }
    }

    /// Map an entry name onto a service key
    fn entry_key(&self, name: &str) -> String {
        format!("{}/{}", self.service.codebase().trim_end_matches('/'), name)
    }

    fn error(&self, source: io::Error, operation: &str, name: &str) -> StorageSystemError {
        StorageSystemError::backend(source, BACKEND_NAME, operation, name)
    }
}

impl StorageBackend for ManagedServiceBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn open_read(&self, _root: &Path, name: &str) -> Result<Box<dyn Read + Send>> {
        let contents = self
            .service
            .get(&self.entry_key(name))
            .map_err(|e| self.error(e, "open", name))?;
        Ok(Box::new(Cursor::new(contents)))
    }

    fn open_write(&self, _root: &Path, name: &str, append: bool) -> Result<Box<dyn Write + Send>> {
        let key = self.entry_key(name);
        let buffer = if append {
            match self.service.get(&key) {
                Ok(existing) => existing,
                Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
                Err(e) => return Err(self.error(e, "write", name).into()),
            }
        } else {
            // Truncate up front so the entry exists even if nothing is written
            self.service.put(&key, &[]).map_err(|e| self.error(e, "write", name))?;
            Vec::new()
        };
        Ok(Box::new(ManagedWriter {
            service: self.service.clone(),
            key,
            buffer,
            dirty: false,
        }))
    }

    fn delete(&self, _root: &Path, name: &str) -> Result<bool> {
        let deleted = self
            .service
            .delete(&self.entry_key(name))
            .map_err(|e| self.error(e, "delete", name))?;
        Ok(deleted)
    }

    fn write_entry(&self, _root: &Path, name: &str, contents: &[u8]) -> Result<()> {
        self.service
            .put(&self.entry_key(name), contents)
            .map_err(|e| self.error(e, "write", name))?;
        Ok(())
    }
}

/// Buffers writes and commits the whole entry to the service on flush.
struct ManagedWriter {
    service: Arc<dyn PersistenceService>,
    key: String,
    buffer: Vec<u8>,
    dirty: bool,
}

impl Write for ManagedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.dirty = true;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.dirty {
            self.service.put(&self.key, &self.buffer)?;
            self.dirty = false;
        }
        Ok(())
    }
}

impl Drop for ManagedWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("Failed to commit managed entry '{}': {}", self.key, e);
        }
    }
}

/// In-process [`PersistenceService`], for embedding runtimes and tests
#[derive(Default)]
pub struct MemoryPersistenceService {
    codebase: String,
    entries: RwLock<HashMap<String, Vec<u8>>>,
    // Number of put calls, observable by embedders
    puts: Mutex<usize>,
}

impl MemoryPersistenceService {
    pub fn new(codebase: impl Into<String>) -> Self {
        Self {
            codebase: codebase.into(),
            ..Self::default()
        }
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn put_count(&self) -> usize {
        *self.puts.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl PersistenceService for MemoryPersistenceService {
    fn codebase(&self) -> &str {
        &self.codebase
    }

    fn get(&self, key: &str) -> io::Result<Vec<u8>> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry for {}", key)))
    }

    fn put(&self, key: &str, contents: &[u8]) -> io::Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.insert(key.to_string(), contents.to_vec());
        *self.puts.lock().unwrap_or_else(|p| p.into_inner()) += 1;
        Ok(())
    }

    fn delete(&self, key: &str) -> io::Result<bool> {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        Ok(entries.remove(key).is_some())
    }
}

impl Debug for MemoryPersistenceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPersistenceService")
            .field("codebase", &self.codebase)
            .field("entries", &self.keys().len())
            .finish()
    }
}
