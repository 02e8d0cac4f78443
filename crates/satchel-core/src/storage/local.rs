use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::kernel::error::Result;
use crate::storage::backend::{StorageBackend, validate_entry_name};
use crate::storage::error::StorageSystemError;

const BACKEND_NAME: &str = "filesystem";

/// Plain filesystem backend, always available
#[derive(Clone, Default)]
pub struct FilesystemBackend;

impl FilesystemBackend {
    /// Create a new filesystem backend
    pub fn new() -> Self {
        Self
    }

    /// Resolve an entry name against the storage root
    fn resolve_path(&self, root: &Path, name: &str) -> Result<PathBuf> {
        validate_entry_name(name)?;
        Ok(root.join(name))
    }

    fn error(&self, source: io::Error, operation: &str, name: &str) -> StorageSystemError {
        StorageSystemError::backend(source, BACKEND_NAME, operation, name)
    }

    /// Make sure the directory holding `path` exists
    fn ensure_parent(&self, path: &Path) -> Result<PathBuf> {
        let parent = path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StorageSystemError::InvalidEntryName {
                reason: format!("{} has no parent directory", path.display()),
            }
        })?;
        if !parent.is_dir() {
            debug!("Creating storage directory {}", parent.display());
            fs::create_dir_all(&parent).map_err(|source| StorageSystemError::DirectoryCreation {
                path: parent.clone(),
                source,
            })?;
        }
        Ok(parent)
    }
}

impl StorageBackend for FilesystemBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn open_read(&self, root: &Path, name: &str) -> Result<Box<dyn Read + Send>> {
        let full_path = self.resolve_path(root, name)?;
        let file = File::open(&full_path).map_err(|e| self.error(e, "open", name))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn open_write(&self, root: &Path, name: &str, append: bool) -> Result<Box<dyn Write + Send>> {
        let full_path = self.resolve_path(root, name)?;
        self.ensure_parent(&full_path)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(&full_path)
            .map_err(|e| self.error(e, "write", name))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn delete(&self, root: &Path, name: &str) -> Result<bool> {
        let full_path = self.resolve_path(root, name)?;
        match fs::remove_file(&full_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.error(e, "delete", name).into()),
        }
    }

    fn write_entry(&self, root: &Path, name: &str, contents: &[u8]) -> Result<()> {
        let full_path = self.resolve_path(root, name)?;
        let parent = self.ensure_parent(&full_path)?;

        // Stage the bytes next to the target, then swap them in
        let mut temp_file = NamedTempFile::new_in(&parent).map_err(|e| self.error(e, "write", name))?;
        temp_file
            .write_all(contents)
            .and_then(|_| temp_file.as_file().sync_all())
            .map_err(|e| self.error(e, "write", name))?;
        temp_file
            .persist(&full_path)
            .map_err(|e| self.error(e.error, "write", name))?;

        Ok(())
    }
}

impl fmt::Debug for FilesystemBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilesystemBackend").finish()
    }
}
