//! # ExpenseDB Sync
//!
//! Background sync coordinator and engine surface for ExpenseDB.
//!
//! This crate provides:
//! - [`RemoteStore`] - the capability contract a remote copy of the
//!   collection must satisfy, plus [`MockRemote`] for testing
//! - [`PendingQueue`] - the first-class FIFO queue of failed sync
//!   operations awaiting manual retry
//! - [`SyncDispatcher`] - a bounded, drainable background worker pushing
//!   per-mutation operations to the remote
//! - [`ExpenseManager`] - the public engine: mutations, queries, full sync
//!   and retry
//!
//! ## Architecture
//!
//! Mutations are **local-first**: the collection is updated and persisted
//! locally before the call returns, then a sync operation is dispatched in
//! the background. The caller never waits on the remote and never sees a
//! remote failure - failed operations accumulate in the pending queue
//! until [`ExpenseManager::retry_pending_syncs`] replays them.
//!
//! Full synchronization ([`ExpenseManager::sync_all`]) reconciles both
//! sides with a last-write-wins merge: fetch remote, merge, persist
//! locally, push upstream.
//!
//! ## Key Invariants
//!
//! - Local persistence completes before any mutation returns
//! - Background dispatch never blocks and never raises into mutations
//! - Pending entries replay in enqueue order, only on explicit retry
//! - Mutations through one manager are atomic with respect to each other

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatcher;
mod error;
mod manager;
mod queue;
mod remote;

pub use config::ManagerConfig;
pub use dispatcher::{DispatchStats, SyncDispatcher};
pub use error::{SyncError, SyncResult};
pub use manager::{ExpenseManager, RetryOutcome};
pub use queue::{PendingEntry, PendingQueue, SyncOp};
pub use remote::{MockRemote, RemoteStore};
