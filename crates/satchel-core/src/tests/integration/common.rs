#![cfg(test)]

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempfile::{TempDir, tempdir};

use crate::kernel::constants::{APPLICATION_ID_KEY, APPLICATION_VENDOR_ID_KEY};
use crate::kernel::context::StaticContext;
use crate::storage::config::StorageConfig;
use crate::storage::manager::LocalStorage;
use crate::storage::selector::BackendKind;
use crate::values::{FilePath, ListModel, Locator, Rect};

/// Bean exercising every built-in fix plus ordinary fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    pub files: ListModel<FilePath>,
    pub homepage: Option<Locator>,
    pub window: Rect,
    pub split_ratio: f64,
}

pub fn workspace() -> Workspace {
    Workspace {
        name: "scratch".to_string(),
        files: ListModel::from(vec![FilePath::new("/tmp/a.txt"), FilePath::new("/tmp/b.txt")]),
        homepage: Some(Locator::parse("https://example.com/").expect("valid locator")),
        window: Rect::new(10, 20, 800, 600),
        split_ratio: 0.5,
    }
}

pub fn test_context() -> StaticContext {
    StaticContext::new("Workbench")
        .with_resource(APPLICATION_ID_KEY, "workbench")
        .with_resource(APPLICATION_VENDOR_ID_KEY, "Acme")
}

/// Filesystem storage rooted in a fresh temporary directory
pub fn setup_storage(config: StorageConfig) -> (LocalStorage, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = StorageConfig {
        backend: BackendKind::Filesystem,
        directory: Some(temp_dir.path().to_path_buf()),
        ..config
    };
    let storage = LocalStorage::with_config(Arc::new(test_context()), config).expect("valid config");
    (storage, temp_dir)
}
