use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::{self, DelegateRegistry, PersistenceDelegate};
use crate::event::{EventDispatcher, EventId, EventResult, StorageEvent};
use crate::kernel::constants::UNLIMITED_STORAGE;
use crate::kernel::context::ApplicationContext;
use crate::kernel::error::Result;
use crate::storage::backend::{StorageBackend, validate_entry_name};
use crate::storage::config::{DataFormat, StorageConfig};
use crate::storage::error::StorageSystemError;
use crate::storage::location::{OsFamily, PlatformEnvironment, resolve_directory};
use crate::storage::managed::ServiceRegistry;
use crate::storage::selector::{BackendSelector, ServiceProbe};

#[derive(Debug, Clone)]
enum DirectoryState {
    Unresolved,
    Resolved(Option<PathBuf>),
}

/// Per-application, per-user local storage.
///
/// Entries are named units of bytes kept under the storage directory by the
/// active backend. Beans are saved and loaded through the serialization
/// pipeline; the directory, the backend and the delegate registry are set up
/// lazily or from a [`StorageConfig`].
pub struct LocalStorage {
    context: Arc<dyn ApplicationContext>,
    environment: PlatformEnvironment,
    format: DataFormat,
    legacy_geometry_fix: bool,
    storage_limit: RwLock<i64>,
    directory: Mutex<DirectoryState>,
    delegates: RwLock<DelegateRegistry>,
    selector: BackendSelector,
    events: EventDispatcher,
}

impl LocalStorage {
    /// Storage with default settings for the given application
    pub fn new(context: Arc<dyn ApplicationContext>) -> Self {
        Self::build(context, StorageConfig::default(), Arc::new(ServiceRegistry::new()))
    }

    /// Storage configured from `config`
    pub fn with_config(context: Arc<dyn ApplicationContext>, config: StorageConfig) -> Result<Self> {
        Self::with_probe(context, config, Arc::new(ServiceRegistry::new()))
    }

    /// Storage configured from `config`, probing `probe` for a managed service
    pub fn with_probe(
        context: Arc<dyn ApplicationContext>,
        config: StorageConfig,
        probe: Arc<dyn ServiceProbe>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(context, config, probe))
    }

    fn build(context: Arc<dyn ApplicationContext>, config: StorageConfig, probe: Arc<dyn ServiceProbe>) -> Self {
        let directory = match config.directory {
            Some(dir) => DirectoryState::Resolved(Some(dir)),
            None => DirectoryState::Unresolved,
        };
        Self {
            context,
            environment: PlatformEnvironment::detect(),
            format: config.format,
            legacy_geometry_fix: config.legacy_geometry_fix,
            storage_limit: RwLock::new(config.storage_limit),
            directory: Mutex::new(directory),
            delegates: RwLock::new(DelegateRegistry::with_builtin_fixes(config.legacy_geometry_fix)),
            selector: BackendSelector::new(config.backend, probe),
            events: EventDispatcher::new(),
        }
    }

    /// Resolve the directory against `environment` instead of the process environment
    pub fn with_environment(mut self, environment: PlatformEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn context(&self) -> &Arc<dyn ApplicationContext> {
        &self.context
    }

    /// Format stored documents are written in
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Name of the active backend, resolving it if needed
    pub fn backend_name(&self) -> String {
        self.selector.backend().name().to_string()
    }

    fn check_name(name: &str) -> Result<()> {
        validate_entry_name(name)
    }

    fn root(&self) -> Result<PathBuf> {
        self.directory()
            .ok_or_else(|| StorageSystemError::DirectoryUnspecified.into())
    }

    fn backend(&self) -> Arc<dyn StorageBackend> {
        self.selector.backend()
    }

    /// Open the entry `name` for reading
    pub fn open_input_file(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        Self::check_name(name)?;
        let root = self.root()?;
        self.backend().open_read(&root, name)
    }

    /// Open the entry `name` for writing, replacing its contents
    pub fn open_output_file(&self, name: &str) -> Result<Box<dyn Write + Send>> {
        self.open_output_file_append(name, false)
    }

    /// Open the entry `name` for writing; with `append` bytes go after the
    /// existing contents
    pub fn open_output_file_append(&self, name: &str, append: bool) -> Result<Box<dyn Write + Send>> {
        Self::check_name(name)?;
        let root = self.root()?;
        self.backend().open_write(&root, name, append)
    }

    /// Delete the entry `name`, returning whether it existed
    pub fn delete_file(&self, name: &str) -> Result<bool> {
        Self::check_name(name)?;
        let root = self.root()?;
        self.backend().delete(&root, name)
    }

    /// Save `bean` as the entry `name`.
    ///
    /// The bean is fully encoded before the backend is touched; an encoding
    /// failure leaves any previous entry as it was.
    pub fn save<T: Serialize + ?Sized>(&self, bean: &T, name: &str) -> Result<()> {
        Self::check_name(name)?;
        let bytes = {
            let delegates = self.delegates.read().unwrap_or_else(|p| p.into_inner());
            codec::encode(bean, &delegates, self.format).map_err(|source| StorageSystemError::Encode {
                name: name.to_string(),
                source,
            })?
        };
        let root = self.root()?;
        self.backend().write_entry(&root, name, &bytes)
    }

    /// Load the bean stored as `name`.
    ///
    /// Returns `Ok(None)` when the entry cannot be opened, typically because
    /// it was never saved. Entries that open but do not decode are errors.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        Self::check_name(name)?;
        let root = self.root()?;
        let mut input = match self.backend().open_read(&root, name) {
            Ok(input) => input,
            Err(e) => {
                debug!("No stored value for '{}': {}", name, e);
                return Ok(None);
            }
        };

        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|e| StorageSystemError::backend(e, self.backend().name(), "read", name))?;
        drop(input);

        let delegates = self.delegates.read().unwrap_or_else(|p| p.into_inner());
        let bean = codec::decode(&bytes, &delegates, self.format).map_err(|source| StorageSystemError::Decode {
            name: name.to_string(),
            source,
        })?;
        Ok(Some(bean))
    }

    /// Advisory storage limit in bytes, -1 when unlimited
    pub fn storage_limit(&self) -> i64 {
        *self.storage_limit.read().unwrap_or_else(|p| p.into_inner())
    }

    /// Set the advisory storage limit; values below -1 are rejected
    pub fn set_storage_limit(&self, storage_limit: i64) -> Result<()> {
        if storage_limit < UNLIMITED_STORAGE {
            return Err(StorageSystemError::InvalidStorageLimit(storage_limit).into());
        }
        let old = {
            let mut current = self.storage_limit.write().unwrap_or_else(|p| p.into_inner());
            std::mem::replace(&mut *current, storage_limit)
        };
        self.events.dispatch(&StorageEvent::StorageLimitChanged {
            old,
            new: storage_limit,
        });
        Ok(())
    }

    /// The storage directory, computed from the platform on first use.
    ///
    /// `None` when the user home cannot be determined.
    pub fn directory(&self) -> Option<PathBuf> {
        let mut state = self.directory.lock().unwrap_or_else(|p| p.into_inner());
        self.resolve_locked(&mut state)
    }

    fn resolve_locked(&self, state: &mut DirectoryState) -> Option<PathBuf> {
        if let DirectoryState::Resolved(directory) = state {
            return directory.clone();
        }

        let application_id = self.context.application_id();
        // Only the Windows layout includes the vendor
        let vendor_id = match self.environment.os_family {
            OsFamily::Windows => self.context.vendor_id(),
            _ => String::new(),
        };
        let directory = resolve_directory(&self.environment, &application_id, &vendor_id);
        debug!("Resolved storage directory: {:?}", directory);
        *state = DirectoryState::Resolved(directory.clone());
        directory
    }

    /// Override the storage directory.
    ///
    /// The announced old value is the directory that was in effect, resolving
    /// the platform default first if it had not been computed yet.
    pub fn set_directory(&self, directory: Option<PathBuf>) {
        let old = {
            let mut state = self.directory.lock().unwrap_or_else(|p| p.into_inner());
            let old = self.resolve_locked(&mut state);
            *state = DirectoryState::Resolved(directory.clone());
            old
        };
        self.events.dispatch(&StorageEvent::DirectoryChanged { old, new: directory });
    }

    /// Copy of the delegate registry, built-in fixes included
    pub fn persistence_delegates(&self) -> DelegateRegistry {
        self.delegates.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Replace the caller-supplied delegates; built-in fixes stay underneath
    pub fn set_persistence_delegates(&self, delegates: HashMap<String, Arc<dyn PersistenceDelegate>>) {
        let mut registry = DelegateRegistry::with_builtin_fixes(self.legacy_geometry_fix);
        registry.extend(delegates);
        *self.delegates.write().unwrap_or_else(|p| p.into_inner()) = registry;
    }

    /// Add one delegate, shadowing any existing one for the type
    pub fn register_delegate(
        &self,
        type_name: impl Into<String>,
        delegate: Arc<dyn PersistenceDelegate>,
    ) -> Option<Arc<dyn PersistenceDelegate>> {
        self.delegates
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .register(type_name, delegate)
    }

    /// Dispatcher carrying this storage object's change events
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Call `listener` on every property change
    pub fn add_change_listener<F>(&self, listener: F) -> EventId
    where
        F: Fn(&StorageEvent) + Send + Sync + 'static,
    {
        self.events.register_type_handler::<StorageEvent, _>(move |event| {
            listener(event);
            EventResult::Continue
        })
    }

    pub fn remove_change_listener(&self, id: EventId) -> bool {
        self.events.unregister_handler(id)
    }
}

impl Debug for LocalStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorage")
            .field("application", &self.context.application_name())
            .field("format", &self.format)
            .field("storage_limit", &self.storage_limit())
            .field("backend", &self.selector.kind())
            .field("backend_resolved", &self.selector.is_resolved())
            .finish()
    }
}
