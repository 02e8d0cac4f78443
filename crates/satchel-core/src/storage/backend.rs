use std::fmt::Debug;
use std::io::{Read, Write};
use std::path::{Component, Path};

use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;

/// Trait for storage media that hold named entries.
///
/// Entry names are opaque to callers; each backend resolves them relative to
/// the storage root it is handed on every call.
pub trait StorageBackend: Send + Sync + Debug {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Open an entry for reading
    fn open_read(&self, root: &Path, name: &str) -> Result<Box<dyn Read + Send>>;

    /// Open an entry for writing, truncating it unless `append` is set.
    /// Missing entries are created.
    fn open_write(&self, root: &Path, name: &str, append: bool) -> Result<Box<dyn Write + Send>>;

    /// Delete an entry, returning whether it existed
    fn delete(&self, root: &Path, name: &str) -> Result<bool>;

    /// Replace an entry with `contents` in one go
    fn write_entry(&self, root: &Path, name: &str, contents: &[u8]) -> Result<()> {
        let mut out = self.open_write(root, name, false)?;
        out.write_all(contents)
            .and_then(|_| out.flush())
            .map_err(|e| StorageSystemError::backend(e, self.name(), "write", name))?;
        Ok(())
    }
}

/// Check that `name` is usable as an entry name.
///
/// Names are relative paths that stay below the storage root: they must be
/// non-empty and may not be absolute or contain `..`.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid_name("entry name is not set"));
    }
    for component in Path::new(name).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(invalid_name(format!("\"{}\" is an absolute path", name)));
            }
            Component::ParentDir => {
                return Err(invalid_name(format!("\"{}\" refers to a parent directory", name)));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}

fn invalid_name(reason: impl Into<String>) -> Error {
    StorageSystemError::InvalidEntryName { reason: reason.into() }.into()
}
