//! Last-write-wins reconciliation of local and remote snapshots.

use crate::expense::Expense;
use std::collections::HashMap;

/// Merges a local and a remote snapshot, keeping the most recently updated
/// version of each record.
///
/// For every id present in both snapshots the record with the strictly
/// later `updated_at` wins; on an exact tie the local record is kept.
/// Records present in only one snapshot are carried over unchanged. The
/// comparison uses `updated_at` alone - `sync_status` does not participate.
///
/// Output order is local order followed by remote-only records in remote
/// order; callers needing a particular order re-sort, e.g. via
/// [`ExpenseStore::list`](crate::ExpenseStore::list).
///
/// The function is pure and idempotent: `merge(local, merge(local, remote))`
/// equals `merge(local, remote)`.
#[must_use]
pub fn merge_last_write_wins(local: &[Expense], remote: &[Expense]) -> Vec<Expense> {
    let mut merged: Vec<Expense> = local.to_vec();
    let mut index: HashMap<&str, usize> = local
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.as_str(), i))
        .collect();

    for record in remote {
        match index.get(record.id.as_str()) {
            Some(&i) => {
                if record.updated_at > merged[i].updated_at {
                    merged[i] = record.clone();
                }
            }
            None => {
                index.insert(record.id.as_str(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    merged
}
