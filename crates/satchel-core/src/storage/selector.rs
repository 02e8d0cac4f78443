use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::storage::backend::StorageBackend;
use crate::storage::local::FilesystemBackend;
use crate::storage::managed::{ManagedServiceBackend, PersistenceService, ServiceRegistry};

/// Which backend a storage object should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Managed when the runtime offers it, filesystem otherwise
    #[default]
    Auto,
    /// Always the filesystem
    Filesystem,
    /// Managed, degrading to the filesystem when unavailable
    Managed,
}

/// Capability check for a managed persistence service.
///
/// Implementations must not have side effects: probing only looks.
pub trait ServiceProbe: Send + Sync + Debug {
    fn probe(&self) -> Option<Arc<dyn PersistenceService>>;
}

impl ServiceProbe for ServiceRegistry {
    fn probe(&self) -> Option<Arc<dyn PersistenceService>> {
        self.lookup_persistence()
    }
}

/// Chooses the active backend once and hands it out afterwards
#[derive(Debug)]
pub struct BackendSelector {
    kind: BackendKind,
    probe: Arc<dyn ServiceProbe>,
    active: OnceLock<Arc<dyn StorageBackend>>,
}

impl BackendSelector {
    pub fn new(kind: BackendKind, probe: Arc<dyn ServiceProbe>) -> Self {
        Self {
            kind,
            probe,
            active: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Whether a backend has been chosen yet
    pub fn is_resolved(&self) -> bool {
        self.active.get().is_some()
    }

    /// The active backend, resolving it on first use.
    ///
    /// Concurrent first calls block on one another; exactly one probe runs.
    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        self.active.get_or_init(|| self.resolve()).clone()
    }

    fn resolve(&self) -> Arc<dyn StorageBackend> {
        let managed = match self.kind {
            BackendKind::Filesystem => None,
            BackendKind::Auto => self.probe.probe(),
            BackendKind::Managed => {
                let service = self.probe.probe();
                if service.is_none() {
                    warn!("Managed persistence service unavailable, falling back to the filesystem");
                }
                service
            }
        };

        let backend: Arc<dyn StorageBackend> = match managed {
            Some(service) => Arc::new(ManagedServiceBackend::new(service)),
            None => Arc::new(FilesystemBackend::new()),
        };
        debug!("Selected '{}' storage backend ({:?})", backend.name(), self.kind);
        backend
    }
}
