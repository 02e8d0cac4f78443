use std::any::Any;
use std::path::PathBuf;

use crate::event::Event;
use crate::kernel::constants::{DIRECTORY_PROPERTY, STORAGE_LIMIT_PROPERTY};

/// Property changes announced by a storage object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    /// The advisory storage limit changed
    StorageLimitChanged { old: i64, new: i64 },
    /// The storage directory was overridden
    DirectoryChanged { old: Option<PathBuf>, new: Option<PathBuf> },
}

impl StorageEvent {
    /// Name of the property that changed
    pub fn property_name(&self) -> &'static str {
        match self {
            StorageEvent::StorageLimitChanged { .. } => STORAGE_LIMIT_PROPERTY,
            StorageEvent::DirectoryChanged { .. } => DIRECTORY_PROPERTY,
        }
    }
}

impl Event for StorageEvent {
    fn name(&self) -> &'static str {
        self.property_name()
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
