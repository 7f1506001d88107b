//! Background dispatch of per-mutation sync operations.

use crate::queue::{PendingQueue, SyncOp};
use crate::remote::RemoteStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Snapshot of the dispatcher's operation counters.
///
/// The per-operation lifecycle is queued, then in-flight, then synced or
/// failed; a failed operation re-enters circulation only through a manual
/// retry pass over the pending queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Operations handed to the dispatcher.
    pub dispatched: u64,
    /// Operations currently being pushed to the remote.
    pub in_flight: u64,
    /// Operations acknowledged by the remote.
    pub synced: u64,
    /// Operations that failed and were captured in the pending queue.
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    in_flight: AtomicU64,
    synced: AtomicU64,
    failed: AtomicU64,
}

enum Envelope {
    Op(SyncOp),
    Barrier(SyncSender<()>),
}

/// Dispatches sync operations to a worker thread without blocking callers.
///
/// Operations enter a bounded channel drained by one worker; the worker
/// pushes each operation to the remote store and captures failures into the
/// pending queue. `dispatch` never blocks: when the channel is full or
/// closed the operation goes straight into the pending queue instead.
///
/// [`flush`](Self::flush) drains the channel deterministically;
/// [`shutdown`](Self::shutdown) (also run on drop) closes the channel and
/// joins the worker so no work is silently abandoned at exit.
pub struct SyncDispatcher {
    tx: Mutex<Option<SyncSender<Envelope>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
    queue: Arc<Mutex<PendingQueue>>,
}

impl SyncDispatcher {
    /// Creates a dispatcher with a worker pushing to `remote`.
    ///
    /// `capacity` bounds the number of operations waiting for the worker.
    /// If the worker thread cannot be spawned the dispatcher degrades to
    /// routing every operation into the pending queue.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        queue: Arc<Mutex<PendingQueue>>,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let counters = Arc::new(Counters::default());

        let worker_counters = Arc::clone(&counters);
        let worker_queue = Arc::clone(&queue);
        let spawned = std::thread::Builder::new()
            .name("expensedb-sync".into())
            .spawn(move || worker_loop(rx, remote, worker_queue, worker_counters));

        let (tx, worker) = match spawned {
            Ok(handle) => (Some(tx), Some(handle)),
            Err(e) => {
                warn!(error = %e, "sync worker unavailable, operations will queue for manual retry");
                (None, None)
            }
        };

        Self {
            tx: Mutex::new(tx),
            worker: Mutex::new(worker),
            counters,
            queue,
        }
    }

    /// Hands an operation to the worker.
    ///
    /// Never blocks. A full or closed channel redirects the operation into
    /// the pending queue so it is not lost.
    pub fn dispatch(&self, op: SyncOp) {
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);

        let tx = self.tx.lock().clone();
        let Some(tx) = tx else {
            self.capture(op);
            return;
        };

        match tx.try_send(Envelope::Op(op)) {
            Ok(()) => {}
            Err(TrySendError::Full(Envelope::Op(op))) => {
                warn!(
                    id = %op.expense_id(),
                    kind = op.kind(),
                    "dispatch channel full, operation queued for manual retry"
                );
                self.capture(op);
            }
            Err(TrySendError::Disconnected(Envelope::Op(op))) => self.capture(op),
            Err(_) => {}
        }
    }

    /// Waits until every previously dispatched operation has been handled.
    pub fn flush(&self) {
        let tx = self.tx.lock().clone();
        if let Some(tx) = tx {
            let (ack_tx, ack_rx) = mpsc::sync_channel(1);
            if tx.send(Envelope::Barrier(ack_tx)).is_ok() {
                let _ = ack_rx.recv();
            }
        }
    }

    /// Closes the channel and joins the worker.
    ///
    /// Operations already in the channel are still processed before the
    /// worker exits. Idempotent.
    pub fn shutdown(&self) {
        self.tx.lock().take();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }

    /// Returns a snapshot of the operation counters.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            in_flight: self.counters.in_flight.load(Ordering::Relaxed),
            synced: self.counters.synced.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    fn capture(&self, op: SyncOp) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.queue.lock().push(op);
    }
}

impl Drop for SyncDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    rx: Receiver<Envelope>,
    remote: Arc<dyn RemoteStore>,
    queue: Arc<Mutex<PendingQueue>>,
    counters: Arc<Counters>,
) {
    while let Ok(envelope) = rx.recv() {
        match envelope {
            Envelope::Op(op) => {
                counters.in_flight.fetch_add(1, Ordering::Relaxed);
                let outcome = match &op {
                    SyncOp::Add(e) | SyncOp::Update(e) => remote.push_expense(e),
                    SyncOp::Delete(id) => remote.delete_expense(id),
                };
                counters.in_flight.fetch_sub(1, Ordering::Relaxed);

                match outcome {
                    Ok(()) => {
                        counters.synced.fetch_add(1, Ordering::Relaxed);
                        debug!(id = %op.expense_id(), kind = op.kind(), "background sync ok");
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            id = %op.expense_id(),
                            kind = op.kind(),
                            error = %e,
                            "background sync failed, queued for retry"
                        );
                        queue.lock().push(op);
                    }
                }
            }
            Envelope::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SyncError, SyncResult};
    use crate::remote::MockRemote;
    use expensedb_core::{Category, Expense, ExpenseId};
    use rust_decimal::Decimal;
    use std::sync::atomic::AtomicBool;

    fn expense(id: &str) -> Expense {
        Expense::new(Decimal::new(100, 2), Category::Other)
            .unwrap()
            .with_id(id)
    }

    fn new_queue() -> Arc<Mutex<PendingQueue>> {
        Arc::new(Mutex::new(PendingQueue::new()))
    }

    #[test]
    fn dispatch_pushes_to_remote() {
        let remote = Arc::new(MockRemote::new());
        let queue = new_queue();
        let dispatcher =
            SyncDispatcher::new(Arc::clone(&remote) as Arc<dyn RemoteStore>, Arc::clone(&queue), 8);

        dispatcher.dispatch(SyncOp::Add(expense("a")));
        dispatcher.dispatch(SyncOp::Update(expense("a")));
        dispatcher.flush();

        assert_eq!(remote.records().len(), 1);
        assert!(queue.lock().is_empty());

        let stats = dispatcher.stats();
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.synced, 2);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn dispatch_delete_removes_from_remote() {
        let remote = Arc::new(MockRemote::with_records(vec![expense("a")]));
        let queue = new_queue();
        let dispatcher =
            SyncDispatcher::new(Arc::clone(&remote) as Arc<dyn RemoteStore>, Arc::clone(&queue), 8);

        dispatcher.dispatch(SyncOp::Delete(ExpenseId::new("a")));
        dispatcher.flush();

        assert!(remote.records().is_empty());
    }

    #[test]
    fn failures_are_captured_in_pending_queue() {
        let remote = Arc::new(MockRemote::new());
        remote.set_connected(false);
        let queue = new_queue();
        let dispatcher =
            SyncDispatcher::new(Arc::clone(&remote) as Arc<dyn RemoteStore>, Arc::clone(&queue), 8);

        dispatcher.dispatch(SyncOp::Add(expense("a")));
        dispatcher.flush();

        assert_eq!(queue.lock().len(), 1);
        assert_eq!(dispatcher.stats().failed, 1);
        assert_eq!(dispatcher.stats().synced, 0);
    }

    /// Remote that blocks until released, for overflow tests.
    struct StallingRemote {
        released: AtomicBool,
    }

    impl StallingRemote {
        fn new() -> Self {
            Self {
                released: AtomicBool::new(false),
            }
        }

        fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }

        fn wait(&self) {
            while !self.released.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
    }

    impl RemoteStore for StallingRemote {
        fn initialize(&self) -> bool {
            true
        }
        fn push_expense(&self, _expense: &Expense) -> SyncResult<()> {
            self.wait();
            Ok(())
        }
        fn delete_expense(&self, _id: &ExpenseId) -> SyncResult<()> {
            self.wait();
            Ok(())
        }
        fn fetch_all(&self) -> SyncResult<Vec<Expense>> {
            Err(SyncError::transport("not supported"))
        }
        fn push_all(&self, _expenses: &[Expense]) -> SyncResult<()> {
            Err(SyncError::transport("not supported"))
        }
    }

    #[test]
    fn overflow_redirects_to_pending_queue_without_blocking() {
        let remote = Arc::new(StallingRemote::new());
        let queue = new_queue();
        let dispatcher =
            SyncDispatcher::new(Arc::clone(&remote) as Arc<dyn RemoteStore>, Arc::clone(&queue), 1);

        // First op occupies the worker; give it a moment to be picked up.
        dispatcher.dispatch(SyncOp::Add(expense("busy")));
        std::thread::sleep(std::time::Duration::from_millis(20));
        // Second fills the channel, third overflows.
        dispatcher.dispatch(SyncOp::Add(expense("waiting")));
        dispatcher.dispatch(SyncOp::Add(expense("overflow")));

        assert_eq!(queue.lock().len(), 1);
        assert_eq!(
            queue.lock().iter().next().unwrap().op.expense_id().as_str(),
            "overflow"
        );

        remote.release();
        dispatcher.flush();
        // Redirected op stays queued; the others completed.
        assert_eq!(queue.lock().len(), 1);
        assert_eq!(dispatcher.stats().synced, 2);
    }

    #[test]
    fn shutdown_drains_and_is_idempotent() {
        let remote = Arc::new(MockRemote::new());
        let queue = new_queue();
        let dispatcher =
            SyncDispatcher::new(Arc::clone(&remote) as Arc<dyn RemoteStore>, Arc::clone(&queue), 8);

        dispatcher.dispatch(SyncOp::Add(expense("a")));
        dispatcher.shutdown();
        dispatcher.shutdown();

        assert_eq!(remote.records().len(), 1);

        // Dispatch after shutdown falls through to the pending queue.
        dispatcher.dispatch(SyncOp::Add(expense("late")));
        assert_eq!(queue.lock().len(), 1);
    }
}
