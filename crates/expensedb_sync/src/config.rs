//! Configuration for the expense manager.

use expensedb_core::STORAGE_KEY;

/// Configuration for [`ExpenseManager`](crate::ExpenseManager).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Storage key the collection is persisted under.
    pub storage_key: String,
    /// Maximum number of operations waiting for the sync worker.
    pub dispatch_capacity: usize,
}

impl ManagerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            dispatch_capacity: 64,
        }
    }

    /// Sets the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the dispatch channel capacity.
    #[must_use]
    pub fn with_dispatch_capacity(mut self, capacity: usize) -> Self {
        self.dispatch_capacity = capacity;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}
