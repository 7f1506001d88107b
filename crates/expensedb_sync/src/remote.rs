//! Remote store capability contract.

use crate::error::{SyncError, SyncResult};
use expensedb_core::{Expense, ExpenseId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// A remote store holds the server-side copy of the record collection.
///
/// This trait abstracts the transport, allowing for different
/// implementations (REST, platform SDK, mock for testing, etc.). The engine
/// is polymorphic over implementations and never assumes a particular
/// network stack.
pub trait RemoteStore: Send + Sync {
    /// Probes the remote store.
    ///
    /// Returns true if the remote is reachable.
    fn initialize(&self) -> bool;

    /// Pushes one record upstream (insert or replace by id).
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be delivered.
    fn push_expense(&self, expense: &Expense) -> SyncResult<()>;

    /// Deletes one record upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion could not be delivered.
    fn delete_expense(&self, id: &ExpenseId) -> SyncResult<()>;

    /// Fetches the full remote snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot could not be retrieved.
    fn fetch_all(&self) -> SyncResult<Vec<Expense>>;

    /// Replaces the remote snapshot with the given records.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot could not be delivered.
    fn push_all(&self, expenses: &[Expense]) -> SyncResult<()>;
}

/// A mock remote store for testing.
///
/// Holds records in memory with upsert-by-id semantics and a connectivity
/// toggle; every operation fails with [`SyncError::Unavailable`] while
/// disconnected.
#[derive(Debug, Default)]
pub struct MockRemote {
    connected: AtomicBool,
    records: RwLock<Vec<Expense>>,
}

impl MockRemote {
    /// Creates a new connected mock remote with no records.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Creates a connected mock remote pre-seeded with records.
    #[must_use]
    pub fn with_records(records: Vec<Expense>) -> Self {
        Self {
            connected: AtomicBool::new(true),
            records: RwLock::new(records),
        }
    }

    /// Sets the connectivity state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Returns a copy of the remote records.
    #[must_use]
    pub fn records(&self) -> Vec<Expense> {
        self.records.read().clone()
    }

    fn ensure_connected(&self) -> SyncResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::Unavailable)
        }
    }
}

impl RemoteStore for MockRemote {
    fn initialize(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn push_expense(&self, expense: &Expense) -> SyncResult<()> {
        self.ensure_connected()?;
        let mut records = self.records.write();
        match records.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense.clone(),
            None => records.push(expense.clone()),
        }
        Ok(())
    }

    fn delete_expense(&self, id: &ExpenseId) -> SyncResult<()> {
        self.ensure_connected()?;
        self.records.write().retain(|e| &e.id != id);
        Ok(())
    }

    fn fetch_all(&self) -> SyncResult<Vec<Expense>> {
        self.ensure_connected()?;
        Ok(self.records.read().clone())
    }

    fn push_all(&self, expenses: &[Expense]) -> SyncResult<()> {
        self.ensure_connected()?;
        *self.records.write() = expenses.to_vec();
        Ok(())
    }
}
