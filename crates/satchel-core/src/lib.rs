//! # satchel-core
//!
//! Per-application, per-user local storage of serde beans.
//!
//! ```no_run
//! use std::sync::Arc;
//! use satchel_core::{LocalStorage, StaticContext};
//!
//! let context = StaticContext::new("Editor").with_resource("Application.id", "editor");
//! let storage = LocalStorage::new(Arc::new(context));
//! storage.save(&vec!["recent.txt".to_string()], "recent.json")?;
//! let recent: Option<Vec<String>> = storage.load("recent.json")?;
//! # Ok::<(), satchel_core::Error>(())
//! ```
pub mod codec;
pub mod event;
pub mod kernel;
pub mod storage;
pub mod values;

pub use codec::{CodecError, DelegateRegistry, Instantiation, PersistenceDelegate, Statement};
pub use event::{Event, EventDispatcher, EventResult, StorageEvent};
pub use kernel::{ApplicationContext, Error, Result, StaticContext};
pub use storage::{
    BackendKind, DataFormat, LocalStorage, OsFamily, PlatformEnvironment, StorageBackend, StorageConfig,
    StorageSystemError,
};
pub use values::{FilePath, ListModel, Locator, Rect};

#[cfg(test)]
mod tests;
