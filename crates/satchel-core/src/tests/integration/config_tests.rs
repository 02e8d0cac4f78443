#![cfg(test)]

use std::sync::Arc;

use tempfile::tempdir;

use crate::kernel::error::Result;
use crate::storage::config::StorageConfig;
use crate::storage::manager::LocalStorage;

use super::common::{Workspace, test_context, workspace};

#[test]
fn test_storage_from_config_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let data_dir = temp_dir.path().join("data");
    let config_path = temp_dir.path().join("satchel.json");
    let config_text = format!(
        r#"{{ "backend": "filesystem", "storage_limit": 65536, "directory": {} }}"#,
        serde_json::to_string(&data_dir).expect("path serializes")
    );
    std::fs::write(&config_path, config_text).expect("write config");

    let config = StorageConfig::load(&config_path)?;
    let storage = LocalStorage::with_config(Arc::new(test_context()), config)?;

    assert_eq!(storage.storage_limit(), 65536);
    assert_eq!(storage.directory(), Some(data_dir.clone()));
    assert_eq!(storage.backend_name(), "filesystem");

    storage.save(&workspace(), "workspace")?;
    assert!(data_dir.join("workspace").is_file());
    assert_eq!(storage.load::<Workspace>("workspace")?, Some(workspace()));
    Ok(())
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_config_selects_document_format() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("satchel.yaml");
    std::fs::write(
        &config_path,
        format!("format: yaml\ndirectory: {}\n", temp_dir.path().join("data").display()),
    )
    .expect("write config");

    let config = StorageConfig::load(&config_path)?;
    let storage = LocalStorage::with_config(Arc::new(test_context()), config)?;
    storage.save(&vec![1, 2, 3], "numbers")?;

    let stored = std::fs::read_to_string(temp_dir.path().join("data").join("numbers")).expect("read entry");
    assert!(stored.starts_with("format:"), "unexpected document: {}", stored);
    assert!(stored.contains("1.0.0"));
    Ok(())
}
