//! Storage adapter trait definition.

use crate::error::StorageResult;

/// A key-value persistence adapter for ExpenseDB.
///
/// Storage adapters are **opaque string stores**. They provide simple
/// operations for saving, loading, and deleting string blobs under string
/// keys. ExpenseDB owns all blob interpretation - adapters do not understand
/// records, collections, or JSON.
///
/// # Invariants
///
/// - `load` returns exactly the value previously saved under that key
/// - A key that was never saved (or was deleted) loads as `None`
/// - Adapters must be `Send + Sync` for concurrent access
///
/// # Failure policy
///
/// Adapters report failures honestly on every operation. The engine layers
/// the availability policy on top: a failed `load` is treated as an absent
/// blob so a corrupted or unavailable store yields an empty collection,
/// while failed `save`/`delete`/`clear` calls propagate to the caller.
///
/// # Implementors
///
/// - [`super::MemoryStorage`] - For testing
/// - [`super::FileStorage`] - For persistent storage
pub trait StorageAdapter: Send + Sync {
    /// Saves `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be made durable.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Loads the value stored under `key`.
    ///
    /// Returns `None` if the key has never been saved or was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreadable.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Deletes the value stored under `key`.
    ///
    /// Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Removes every key from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared.
    fn clear(&self) -> StorageResult<()>;
}
