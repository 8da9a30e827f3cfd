use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::StoreError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))?;
        }
        Ok(())
    }

    /// Read a file to a string, `None` when it does not exist
    pub fn read_optional<P: AsRef<Path>>(path: P) -> Result<Option<String>, StoreError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Replace a file's content atomically.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the target, so readers see either the old or the
    /// new content.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<(), StoreError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::ensure_dir(dir)?;

        let mut file = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| StoreError::io(file.path(), e))?;
        file.persist(path).map_err(|e| StoreError::io(path, e.error))?;

        Ok(())
    }

    /// Remove a file if it exists
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}
