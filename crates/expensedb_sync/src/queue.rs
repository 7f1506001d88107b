//! Pending sync queue for failed background operations.

use chrono::{DateTime, Utc};
use expensedb_core::{Expense, ExpenseId};
use std::collections::VecDeque;

/// One synchronization operation against the remote store.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOp {
    /// Push a newly created record.
    Add(Expense),
    /// Push an updated record.
    Update(Expense),
    /// Delete a record by id.
    Delete(ExpenseId),
}

impl SyncOp {
    /// Returns the id of the record the operation targets.
    #[must_use]
    pub fn expense_id(&self) -> &ExpenseId {
        match self {
            SyncOp::Add(e) | SyncOp::Update(e) => &e.id,
            SyncOp::Delete(id) => id,
        }
    }

    /// Returns a short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            SyncOp::Add(_) => "add",
            SyncOp::Update(_) => "update",
            SyncOp::Delete(_) => "delete",
        }
    }
}

/// A failed operation awaiting manual retry.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    /// The operation to replay.
    pub op: SyncOp,
    /// When the entry was queued.
    pub enqueued_at: DateTime<Utc>,
}

impl PendingEntry {
    /// Creates an entry queued now.
    #[must_use]
    pub fn new(op: SyncOp) -> Self {
        Self {
            op,
            enqueued_at: Utc::now(),
        }
    }
}

/// The pending sync queue.
///
/// Entries are appended when a background sync fails and removed only by a
/// successful replay. Replay order is enqueue order (FIFO); entries for the
/// same record id are kept and replayed independently - the queue does not
/// coalesce duplicates.
///
/// The queue lives in memory for the process lifetime of the engine.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<PendingEntry>,
}

impl PendingQueue {
    /// Creates a new empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failed operation, stamped now.
    pub fn push(&mut self, op: SyncOp) {
        self.entries.push_back(PendingEntry::new(op));
    }

    /// Appends an existing entry, keeping its original timestamp.
    pub fn push_entry(&mut self, entry: PendingEntry) {
        self.entries.push_back(entry);
    }

    /// Takes every entry out of the queue, oldest first.
    pub fn drain(&mut self) -> Vec<PendingEntry> {
        self.entries.drain(..).collect()
    }

    /// Puts entries back at the front of the queue, preserving their
    /// relative order ahead of anything queued in the meantime.
    pub fn requeue_front(&mut self, entries: Vec<PendingEntry>) {
        for entry in entries.into_iter().rev() {
            self.entries.push_front(entry);
        }
    }

    /// Returns the number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PendingEntry> {
        self.entries.iter()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expensedb_core::Category;
    use rust_decimal::Decimal;

    fn add_op(id: &str) -> SyncOp {
        SyncOp::Add(
            Expense::new(Decimal::new(100, 2), Category::Other)
                .unwrap()
                .with_id(id),
        )
    }

    #[test]
    fn push_and_drain_are_fifo() {
        let mut queue = PendingQueue::new();
        queue.push(add_op("a"));
        queue.push(add_op("b"));
        queue.push(SyncOp::Delete(ExpenseId::new("c")));

        let drained = queue.drain();
        assert!(queue.is_empty());
        let ids: Vec<&str> = drained.iter().map(|e| e.op.expense_id().as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn duplicates_are_not_coalesced() {
        let mut queue = PendingQueue::new();
        queue.push(add_op("a"));
        queue.push(add_op("a"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn requeue_front_preserves_age_order() {
        let mut queue = PendingQueue::new();
        queue.push(add_op("newer"));

        let old = vec![PendingEntry::new(add_op("old_1")), PendingEntry::new(add_op("old_2"))];
        queue.requeue_front(old);

        let ids: Vec<&str> = queue.iter().map(|e| e.op.expense_id().as_str()).collect();
        assert_eq!(ids, ["old_1", "old_2", "newer"]);
    }

    #[test]
    fn op_kind_names() {
        assert_eq!(add_op("a").kind(), "add");
        assert_eq!(SyncOp::Delete(ExpenseId::new("a")).kind(), "delete");
    }

    #[test]
    fn clear_empties_the_queue() {
        let mut queue = PendingQueue::new();
        queue.push(add_op("a"));
        queue.clear();
        assert!(queue.is_empty());
    }
}
