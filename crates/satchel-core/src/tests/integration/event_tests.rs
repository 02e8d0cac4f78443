#![cfg(test)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::event::{EventResult, StorageEvent};
use crate::kernel::constants::{DIRECTORY_PROPERTY, STORAGE_LIMIT_PROPERTY};
use crate::kernel::error::Result;
use crate::storage::config::StorageConfig;

use super::common::setup_storage;

#[test]
fn test_named_handlers_see_only_their_property() -> Result<()> {
    let (storage, temp_dir) = setup_storage(StorageConfig::default());
    let limits = Arc::new(Mutex::new(Vec::new()));
    let sink = limits.clone();
    storage.events().register_handler(STORAGE_LIMIT_PROPERTY, move |event| {
        sink.lock().unwrap().push(event.name().to_string());
        EventResult::Continue
    });

    storage.set_storage_limit(2048)?;
    storage.set_directory(Some(temp_dir.path().join("moved")));

    assert_eq!(*limits.lock().unwrap(), vec![STORAGE_LIMIT_PROPERTY.to_string()]);
    Ok(())
}

#[test]
fn test_directory_change_redirects_saves() -> Result<()> {
    let (storage, temp_dir) = setup_storage(StorageConfig::default());
    let moved: PathBuf = temp_dir.path().join("moved");
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    storage.add_change_listener(move |event| sink.lock().unwrap().push(event.property_name()));

    storage.set_directory(Some(moved.clone()));
    storage.save(&"hello", "greeting")?;

    assert!(moved.join("greeting").is_file());
    assert!(!temp_dir.path().join("greeting").exists());
    assert_eq!(*events.lock().unwrap(), vec![DIRECTORY_PROPERTY]);
    Ok(())
}

#[test]
fn test_stop_ends_propagation() -> Result<()> {
    let (storage, _temp_dir) = setup_storage(StorageConfig::default());
    let seen = Arc::new(Mutex::new(0));
    storage
        .events()
        .register_type_handler::<StorageEvent, _>(|_| EventResult::Stop);
    let sink = seen.clone();
    storage.add_change_listener(move |_| *sink.lock().unwrap() += 1);

    storage.set_storage_limit(1)?;

    assert_eq!(*seen.lock().unwrap(), 0);
    Ok(())
}
