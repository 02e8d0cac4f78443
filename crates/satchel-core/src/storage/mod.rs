//! # Storage
//!
//! Backends, backend selection, directory resolution, configuration and the
//! [`LocalStorage`] facade applications use.
pub mod backend;
pub mod config;
pub mod error;
pub mod local;
pub mod location;
pub mod managed;
pub mod manager;
pub mod selector;

/// Re-export key types
pub use backend::StorageBackend;
pub use config::{ConfigData, DataFormat, StorageConfig};
pub use error::StorageSystemError;
pub use local::FilesystemBackend;
pub use location::{OsFamily, PlatformEnvironment, resolve_directory};
pub use managed::{ManagedServiceBackend, MemoryPersistenceService, PersistenceService, ServiceRegistry};
pub use manager::LocalStorage;
pub use selector::{BackendKind, BackendSelector, ServiceProbe};

// Test module declaration
#[cfg(test)]
mod tests;
