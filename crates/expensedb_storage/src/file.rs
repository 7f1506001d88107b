//! File-based storage adapter for persistent storage.

use crate::adapter::StorageAdapter;
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file-based storage adapter.
///
/// Each key is stored as one file (`<root>/<key>.json`) under a root
/// directory. Data survives process restarts.
///
/// # Durability
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous value intact rather than a torn blob.
///
/// # Thread Safety
///
/// The adapter holds no mutable state; concurrent access maps to concurrent
/// file operations. One adapter instance per root directory is expected.
///
/// # Example
///
/// ```no_run
/// use expensedb_storage::{StorageAdapter, FileStorage};
/// use std::path::Path;
///
/// let storage = FileStorage::open(Path::new("/var/lib/expensedb")).unwrap();
/// storage.save("mykey", "payload").unwrap();
/// ```
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens a file storage rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        // Keys are short identifiers; path separators would escape the root.
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(StorageError::backend(format!("invalid storage key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl StorageAdapter for FileStorage {
    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> StorageResult<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn file_save_then_load() {
        let (_dir, storage) = open_temp();
        storage.save("records", "[1,2,3]").unwrap();
        assert_eq!(storage.load("records").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn file_load_missing_returns_none() {
        let (_dir, storage) = open_temp();
        assert_eq!(storage.load("missing").unwrap(), None);
    }

    #[test]
    fn file_save_overwrites() {
        let (_dir, storage) = open_temp();
        storage.save("k", "old").unwrap();
        storage.save("k", "new").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn file_delete_removes_blob() {
        let (_dir, storage) = open_temp();
        storage.save("k", "v").unwrap();
        storage.delete("k").unwrap();
        assert_eq!(storage.load("k").unwrap(), None);
    }

    #[test]
    fn file_delete_absent_key_is_ok() {
        let (_dir, storage) = open_temp();
        assert!(storage.delete("never-saved").is_ok());
    }

    #[test]
    fn file_clear_removes_all_blobs() {
        let (_dir, storage) = open_temp();
        storage.save("a", "1").unwrap();
        storage.save("b", "2").unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.load("a").unwrap(), None);
        assert_eq!(storage.load("b").unwrap(), None);
    }

    #[test]
    fn file_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::open(dir.path()).unwrap();
            storage.save("k", "persisted").unwrap();
        }
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn file_rejects_traversal_keys() {
        let (_dir, storage) = open_temp();
        assert!(storage.save("../escape", "v").is_err());
        assert!(storage.load("a/b").is_err());
        assert!(storage.save("", "v").is_err());
    }
}
