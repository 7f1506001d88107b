//! In-memory storage adapter for testing.

use crate::adapter::StorageAdapter;
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory storage adapter.
///
/// This adapter stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral collections that don't need persistence
///
/// # Thread Safety
///
/// This adapter is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use expensedb_storage::{StorageAdapter, MemoryStorage};
///
/// let storage = MemoryStorage::new();
/// storage.save("k", "v").unwrap();
/// assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates a new empty in-memory adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter pre-seeded with key-value pairs.
    ///
    /// Useful for testing startup and recovery scenarios.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl StorageAdapter for MemoryStorage {
    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.data.write().clear();
        Ok(())
    }
}
