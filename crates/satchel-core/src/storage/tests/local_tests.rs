use std::io::{Read, Write};
use std::path::Path;

use tempfile::tempdir;

use crate::kernel::error::{Error, Result};
use crate::storage::backend::StorageBackend;
use crate::storage::error::StorageSystemError;
use crate::storage::local::FilesystemBackend;

fn read_entry(backend: &FilesystemBackend, root: &Path, name: &str) -> Result<Vec<u8>> {
    let mut input = backend.open_read(root, name)?;
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes).expect("read entry");
    Ok(bytes)
}

#[test]
fn test_write_and_read_entry() -> Result<()> {
    // Create temp directory for test
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let backend = FilesystemBackend::new();

    {
        let mut out = backend.open_write(temp_dir.path(), "test.key", false)?;
        out.write_all(b"test data").expect("write entry");
    }

    assert_eq!(read_entry(&backend, temp_dir.path(), "test.key")?, b"test data");
    Ok(())
}

#[test]
fn test_write_creates_missing_parent_directories() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let root = temp_dir.path().join("not").join("yet");
    let backend = FilesystemBackend::new();

    {
        let mut out = backend.open_write(&root, "nested/entry.bin", false)?;
        out.write_all(b"nested test data").expect("write entry");
    }

    assert!(root.join("nested").is_dir());
    assert_eq!(read_entry(&backend, &root, "nested/entry.bin")?, b"nested test data");
    Ok(())
}

#[test]
fn test_append_and_truncate() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let backend = FilesystemBackend::new();

    backend.open_write(temp_dir.path(), "log.txt", true)?.write_all(b"one,").expect("write");
    backend.open_write(temp_dir.path(), "log.txt", true)?.write_all(b"two").expect("write");
    assert_eq!(read_entry(&backend, temp_dir.path(), "log.txt")?, b"one,two");

    backend.open_write(temp_dir.path(), "log.txt", false)?.write_all(b"new").expect("write");
    assert_eq!(read_entry(&backend, temp_dir.path(), "log.txt")?, b"new");
    Ok(())
}

#[test]
fn test_read_missing_entry_is_backend_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let backend = FilesystemBackend::new();

    match backend.open_read(temp_dir.path(), "missing") {
        Err(Error::StorageSystem(e @ StorageSystemError::Backend { .. })) => {
            assert!(e.is_not_found());
            assert!(e.to_string().contains("\"missing\""), "Error should name the entry: {}", e);
        }
        Err(other) => panic!("Unexpected error: {}", other),
        Ok(_) => panic!("Reading a missing entry should fail"),
    }
}

#[test]
fn test_delete() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let backend = FilesystemBackend::new();

    assert!(!backend.delete(temp_dir.path(), "absent")?, "Deleting a missing entry returns false");

    backend.write_entry(temp_dir.path(), "present", b"x")?;
    assert!(backend.delete(temp_dir.path(), "present")?);
    assert!(!temp_dir.path().join("present").exists());
    Ok(())
}

#[test]
fn test_write_entry_replaces_contents() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let backend = FilesystemBackend::new();

    backend.write_entry(temp_dir.path(), "state.json", b"a much longer first version")?;
    backend.write_entry(temp_dir.path(), "state.json", b"short")?;

    assert_eq!(read_entry(&backend, temp_dir.path(), "state.json")?, b"short");
    // No staging files left behind
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path()).expect("list").collect();
    assert_eq!(leftovers.len(), 1);
    Ok(())
}

#[test]
fn test_parent_that_is_a_file_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    std::fs::write(temp_dir.path().join("blocker"), b"file").expect("create blocker");
    let backend = FilesystemBackend::new();

    let result = backend.open_write(temp_dir.path(), "blocker/entry", false);
    assert!(matches!(
        result,
        Err(Error::StorageSystem(StorageSystemError::DirectoryCreation { .. }))
    ));
}

#[test]
fn test_names_outside_the_root_are_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let root = temp_dir.path().join("root");
    let outside = temp_dir.path().join("outside.txt");
    let absolute = outside.to_str().expect("utf-8 temp path");
    let backend = FilesystemBackend::new();

    for name in [absolute, "../outside.txt", "a/../../outside.txt"] {
        assert!(matches!(
            backend.write_entry(&root, name, b"data"),
            Err(Error::StorageSystem(StorageSystemError::InvalidEntryName { .. }))
        ));
        assert!(backend.open_write(&root, name, true).is_err());
        assert!(backend.open_read(&root, name).is_err());
        assert!(backend.delete(&root, name).is_err());
    }

    assert!(!outside.exists());
}
