#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::kernel::error::{Error, Result};
use crate::storage::config::{DataFormat, StorageConfig};
use crate::storage::error::StorageSystemError;

use super::common::{Workspace, setup_storage, workspace};

#[test]
fn test_workspace_round_trip() -> Result<()> {
    let (storage, temp_dir) = setup_storage(StorageConfig::default());

    storage.save(&workspace(), "workspace.json")?;

    let stored = std::fs::read_to_string(temp_dir.path().join("workspace.json")).expect("read entry");
    assert!(stored.contains("\"$type\": \"satchel::ListModel\""));
    assert!(stored.contains("\"$type\": \"satchel::FilePath\""));
    assert!(stored.contains("\"$type\": \"satchel::Locator\""));
    assert!(!stored.contains("\"$type\": \"satchel::Rect\""));

    assert_eq!(storage.load::<Workspace>("workspace.json")?, Some(workspace()));
    Ok(())
}

#[test]
fn test_legacy_geometry_round_trip() -> Result<()> {
    let (storage, temp_dir) = setup_storage(StorageConfig {
        legacy_geometry_fix: true,
        ..StorageConfig::default()
    });

    storage.save(&workspace(), "workspace")?;

    let stored = std::fs::read_to_string(temp_dir.path().join("workspace")).expect("read entry");
    assert!(stored.contains("\"$type\": \"satchel::Rect\""));
    assert_eq!(storage.load::<Workspace>("workspace")?, Some(workspace()));
    Ok(())
}

#[test]
fn test_overwrite_replaces_bean() -> Result<()> {
    let (storage, _temp_dir) = setup_storage(StorageConfig::default());

    storage.save(&workspace(), "workspace")?;
    let mut renamed = workspace();
    renamed.name = "renamed".to_string();
    renamed.homepage = None;
    storage.save(&renamed, "workspace")?;

    assert_eq!(storage.load::<Workspace>("workspace")?, Some(renamed));
    Ok(())
}

#[test]
fn test_other_formats_round_trip() -> Result<()> {
    let mut formats = Vec::new();
    #[cfg(feature = "yaml-config")]
    formats.push(DataFormat::Yaml);
    #[cfg(feature = "toml-config")]
    formats.push(DataFormat::Toml);

    for format in formats {
        let (storage, _temp_dir) = setup_storage(StorageConfig {
            format,
            ..StorageConfig::default()
        });
        storage.save(&workspace(), "workspace")?;
        assert_eq!(storage.load::<Workspace>("workspace")?, Some(workspace()), "format {:?}", format);

        let mut offline = workspace();
        offline.homepage = None;
        storage.save(&offline, "offline")?;
        assert_eq!(storage.load::<Workspace>("offline")?, Some(offline), "format {:?}", format);
    }
    Ok(())
}

#[test]
fn test_maps_with_dollar_keys_round_trip() -> Result<()> {
    let mut formats = vec![DataFormat::Json];
    #[cfg(feature = "yaml-config")]
    formats.push(DataFormat::Yaml);
    #[cfg(feature = "toml-config")]
    formats.push(DataFormat::Toml);

    let mut headers = HashMap::new();
    headers.insert("$type".to_string(), "text/plain".to_string());
    headers.insert("$null".to_string(), "none".to_string());
    headers.insert("$$ref".to_string(), "#/a".to_string());
    headers.insert("charset".to_string(), "utf-8".to_string());

    for format in formats {
        let (storage, _temp_dir) = setup_storage(StorageConfig {
            format,
            ..StorageConfig::default()
        });
        storage.save(&headers, "headers")?;
        assert_eq!(
            storage.load::<HashMap<String, String>>("headers")?,
            Some(headers.clone()),
            "format {:?}",
            format
        );
    }
    Ok(())
}

/// A bean's own type sharing a name with one of the built-in value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FilePath {
    path: String,
    pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Rect {
    left: i32,
    top: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Bookmarks {
    pinned: Vec<FilePath>,
    area: Rect,
}

#[test]
fn test_bean_types_named_like_builtins_keep_their_fields() -> Result<()> {
    let (storage, temp_dir) = setup_storage(StorageConfig {
        legacy_geometry_fix: true,
        ..StorageConfig::default()
    });
    let bookmarks = Bookmarks {
        pinned: vec![FilePath {
            path: "/tmp/a.txt".to_string(),
            pinned: true,
        }],
        area: Rect { left: 3, top: 4 },
    };

    storage.save(&bookmarks, "bookmarks")?;

    let stored = std::fs::read_to_string(temp_dir.path().join("bookmarks")).expect("read entry");
    assert!(!stored.contains("$type"), "unexpected record in {}", stored);
    assert_eq!(storage.load::<Bookmarks>("bookmarks")?, Some(bookmarks));
    Ok(())
}

#[test]
fn test_entry_written_in_one_format_fails_in_another() -> Result<()> {
    let (writer, temp_dir) = setup_storage(StorageConfig::default());
    writer.save(&workspace(), "workspace")?;

    #[cfg(feature = "yaml-config")]
    {
        let reader = crate::storage::manager::LocalStorage::with_config(
            Arc::new(super::common::test_context()),
            StorageConfig {
                format: DataFormat::Yaml,
                directory: Some(temp_dir.path().to_path_buf()),
                backend: crate::storage::selector::BackendKind::Filesystem,
                ..StorageConfig::default()
            },
        )?;
        // JSON is valid YAML, so the document parses and the bean decodes
        assert_eq!(reader.load::<Workspace>("workspace")?, Some(workspace()));
    }

    std::fs::write(temp_dir.path().join("workspace"), "format: [1").expect("write entry");
    assert!(matches!(
        writer.load::<Workspace>("workspace"),
        Err(Error::StorageSystem(StorageSystemError::Decode { .. }))
    ));
    Ok(())
}

#[test]
fn test_concurrent_saves_to_distinct_entries() -> Result<()> {
    let (storage, _temp_dir) = setup_storage(StorageConfig::default());
    let storage = Arc::new(storage);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let storage = storage.clone();
            thread::spawn(move || {
                let mut bean = workspace();
                bean.name = format!("worker-{}", i);
                storage.save(&bean, &format!("workspace-{}", i))
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked")?;
    }

    for i in 0..4 {
        let bean = storage.load::<Workspace>(&format!("workspace-{}", i))?.expect("saved bean");
        assert_eq!(bean.name, format!("worker-{}", i));
    }
    Ok(())
}
