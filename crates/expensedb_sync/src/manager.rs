//! The public engine surface: mutations, queries and synchronization.

use crate::config::ManagerConfig;
use crate::dispatcher::{DispatchStats, SyncDispatcher};
use crate::queue::{PendingQueue, SyncOp};
use crate::remote::RemoteStore;
use expensedb_core::{
    merge_last_write_wins, Category, CoreResult, Expense, ExpenseAnalysis, ExpenseFilter,
    ExpenseId, ExpensePatch, ExpenseStore,
};
use expensedb_storage::StorageAdapter;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Result of a manual retry pass over the pending queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryOutcome {
    /// Entries replayed successfully.
    pub success: usize,
    /// Entries that failed again.
    pub failed: usize,
    /// Entries left in the queue after the pass.
    pub remaining: usize,
}

/// The expense engine: an in-memory collection with synchronous local
/// persistence and non-blocking background synchronization.
///
/// Every mutation updates the collection, persists it locally (the caller
/// waits for this), then hands a sync operation to the background
/// dispatcher (the caller never waits for this). Background failures land
/// in the pending queue for [`retry_pending_syncs`](Self::retry_pending_syncs);
/// they are never raised to the mutation caller.
///
/// # Concurrency
///
/// One manager is a single logical writer: the collection sits behind a
/// lock held across each whole read-mutate-persist sequence, so concurrent
/// mutations through the same manager are atomic with respect to each
/// other. Completion order of background sync relative to later mutations
/// is unspecified. Independent manager instances sharing one storage key
/// are not coordinated and can overwrite each other's blobs.
pub struct ExpenseManager {
    store: RwLock<ExpenseStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    queue: Arc<Mutex<PendingQueue>>,
    dispatcher: Option<SyncDispatcher>,
}

impl ExpenseManager {
    /// Creates a manager without a remote store (local only).
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self::with_config(storage, None, ManagerConfig::default())
    }

    /// Creates a manager syncing to the given remote store.
    pub fn with_remote(storage: Arc<dyn StorageAdapter>, remote: Arc<dyn RemoteStore>) -> Self {
        Self::with_config(storage, Some(remote), ManagerConfig::default())
    }

    /// Creates a manager with explicit configuration.
    pub fn with_config(
        storage: Arc<dyn StorageAdapter>,
        remote: Option<Arc<dyn RemoteStore>>,
        config: ManagerConfig,
    ) -> Self {
        let store = ExpenseStore::with_key(storage, config.storage_key);
        let queue = Arc::new(Mutex::new(PendingQueue::new()));
        let dispatcher = remote.as_ref().map(|remote| {
            SyncDispatcher::new(
                Arc::clone(remote),
                Arc::clone(&queue),
                config.dispatch_capacity,
            )
        });

        Self {
            store: RwLock::new(store),
            remote,
            queue,
            dispatcher,
        }
    }

    /// Loads the local collection and probes the remote store.
    ///
    /// A missing, unreadable or corrupt local blob yields an empty
    /// collection (logged by the store). Returns whether the remote is
    /// reachable; false when no remote is configured.
    pub fn initialize(&self) -> bool {
        self.store.write().load();
        match &self.remote {
            Some(remote) => {
                let reachable = remote.initialize();
                if reachable {
                    debug!("remote store reachable");
                } else {
                    warn!("remote store unreachable, records will sync on retry");
                }
                reachable
            }
            None => false,
        }
    }

    /// Adds a record: persist locally, then sync in the background.
    ///
    /// Returns the stored record. A background sync failure is captured in
    /// the pending queue, never raised here.
    ///
    /// # Errors
    ///
    /// Propagates validation and local persistence errors; the record is
    /// not stored in that case.
    pub fn add_expense(&self, expense: Expense) -> CoreResult<Expense> {
        let stored = self.store.write().add(expense)?;
        self.dispatch(SyncOp::Add(stored.clone()));
        Ok(stored)
    }

    /// Patches the record with the given id.
    ///
    /// Returns `Ok(None)` when no record has the id; nothing is persisted
    /// or synced in that case.
    ///
    /// # Errors
    ///
    /// Propagates validation and local persistence errors.
    pub fn update_expense(
        &self,
        id: &ExpenseId,
        patch: ExpensePatch,
    ) -> CoreResult<Option<Expense>> {
        let updated = self.store.write().update(id, patch)?;
        if let Some(updated) = &updated {
            self.dispatch(SyncOp::Update(updated.clone()));
        }
        Ok(updated)
    }

    /// Removes every record with the given id.
    ///
    /// Returns whether anything was removed. The deletion is synced in the
    /// background regardless, so a record unknown locally can still be
    /// cleaned up remotely.
    ///
    /// # Errors
    ///
    /// Propagates local persistence errors.
    pub fn delete_expense(&self, id: &ExpenseId) -> CoreResult<bool> {
        let removed = self.store.write().remove(id)?;
        self.dispatch(SyncOp::Delete(id.clone()));
        Ok(removed)
    }

    /// Returns the matching records, sorted by event date descending.
    #[must_use]
    pub fn expenses(&self, filter: &ExpenseFilter) -> Vec<Expense> {
        self.store.read().list(filter)
    }

    /// Returns the sum of amounts over the matching records.
    #[must_use]
    pub fn total(&self, filter: &ExpenseFilter) -> Decimal {
        self.store.read().total(filter)
    }

    /// Returns per-category sums over the matching records.
    #[must_use]
    pub fn by_category(&self, filter: &ExpenseFilter) -> BTreeMap<Category, Decimal> {
        self.store.read().by_category(filter)
    }

    /// Returns total, per-category sums and records in one pass.
    #[must_use]
    pub fn analysis(&self, filter: &ExpenseFilter) -> ExpenseAnalysis {
        self.store.read().analysis(filter)
    }

    /// Runs a full synchronization cycle.
    ///
    /// Fetches the remote snapshot, merges it with the local collection
    /// (last write wins by `updated_at`), persists the merged snapshot
    /// locally, then pushes it upstream. Returns true only if every step
    /// succeeded; any failure is logged and yields false without raising,
    /// so callers cannot tell which step failed.
    ///
    /// The merged snapshot is persisted locally before the upstream push.
    /// If the push fails, local storage is already at the merged state
    /// while the remote is not, and there is no rollback - local
    /// durability is favored over atomicity.
    pub fn sync_all(&self) -> bool {
        let Some(remote) = &self.remote else {
            warn!("full sync requested without a remote store");
            return false;
        };

        let remote_records = match remote.fetch_all() {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "full sync failed fetching remote snapshot");
                return false;
            }
        };

        let merged = {
            let mut store = self.store.write();
            let merged = merge_last_write_wins(store.expenses(), &remote_records);
            if let Err(e) = store.replace_all(merged.clone()) {
                error!(error = %e, "full sync failed persisting merged snapshot");
                return false;
            }
            merged
        };

        if let Err(e) = remote.push_all(&merged) {
            error!(error = %e, "full sync failed pushing merged snapshot; local is ahead of remote");
            return false;
        }

        debug!(records = merged.len(), "full sync completed");
        true
    }

    /// Replays the pending queue against the remote store.
    ///
    /// Entries replay in enqueue order and are classified independently;
    /// entries that fail again go back to the front of the queue, ahead of
    /// anything enqueued during the pass. Duplicate entries for one id are
    /// not coalesced. There is no automatic retry anywhere - this call is
    /// the only way a failed operation runs again.
    pub fn retry_pending_syncs(&self) -> RetryOutcome {
        let Some(remote) = &self.remote else {
            return RetryOutcome {
                remaining: self.queue.lock().len(),
                ..RetryOutcome::default()
            };
        };

        let entries = self.queue.lock().drain();
        if entries.is_empty() {
            return RetryOutcome::default();
        }

        let mut success = 0;
        let mut requeue = Vec::new();
        for entry in entries {
            let outcome = match &entry.op {
                SyncOp::Add(e) | SyncOp::Update(e) => remote.push_expense(e),
                SyncOp::Delete(id) => remote.delete_expense(id),
            };
            match outcome {
                Ok(()) => success += 1,
                Err(e) => {
                    warn!(
                        id = %entry.op.expense_id(),
                        kind = entry.op.kind(),
                        error = %e,
                        "retry failed, entry stays queued"
                    );
                    requeue.push(entry);
                }
            }
        }

        let failed = requeue.len();
        let mut queue = self.queue.lock();
        queue.requeue_front(requeue);
        RetryOutcome {
            success,
            failed,
            remaining: queue.len(),
        }
    }

    /// Returns the number of operations awaiting manual retry.
    #[must_use]
    pub fn pending_sync_count(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns the background dispatcher's counters.
    #[must_use]
    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatcher
            .as_ref()
            .map(SyncDispatcher::stats)
            .unwrap_or_default()
    }

    /// Waits until every dispatched background operation has been handled.
    ///
    /// Useful before shutdown and in tests; mutations never need this.
    pub fn flush_sync(&self) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.flush();
        }
    }

    fn dispatch(&self, op: SyncOp) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.dispatch(op);
        }
    }
}
