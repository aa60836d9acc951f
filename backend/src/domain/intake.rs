//! Intake worker pool.
//!
//! A fixed number of workers drain the intake queue concurrently, fetch each
//! order's details, and hand them to placement. The pool is deliberately
//! bounded (workers share one queue) rather than spawning a task per intake
//! item, capping resource usage under load.
//!
//! Intake is best effort: a full shelf or a store failure drops the order
//! with a log line and the worker moves on. Requeueing would not help an
//! already-decaying order, and one bad order must never stall the pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::placement::PlacementService;
use crate::domain::ports::{IntakeQueue, OrderRepository, ShelfOrderStore};
use crate::domain::{ErrorCode, OrderId};

/// Worker pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakePoolConfig {
    /// Number of concurrent workers draining the queue.
    pub workers: usize,
    /// Sleep between polls when the queue is empty or unavailable.
    pub poll_interval: Duration,
}

impl Default for IntakePoolConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// What a single poll observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Nothing queued; the worker sleeps before polling again.
    QueueEmpty,
    /// Queue transport failed; logged, worker keeps polling.
    QueueUnavailable,
    /// Payload did not parse as an order id; logged and skipped.
    SkippedCorruptPayload,
    /// The referenced order could not be fetched; logged and dropped.
    SkippedMissingOrder(OrderId),
    /// Order landed on a shelf.
    Placed(OrderId),
    /// Both tiers at capacity; order dropped, never retried.
    DroppedFullShelf(OrderId),
    /// Store failure during placement; order dropped to keep the pool moving.
    DroppedStoreError(OrderId),
}

/// Pool of intake workers sharing one queue.
pub struct IntakeWorkerPool<Q, R, S> {
    queue: Arc<Q>,
    orders: Arc<R>,
    placement: Arc<PlacementService<S>>,
    config: IntakePoolConfig,
}

impl<Q, R, S> Clone for IntakeWorkerPool<Q, R, S> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            orders: Arc::clone(&self.orders),
            placement: Arc::clone(&self.placement),
            config: self.config,
        }
    }
}

impl<Q, R, S> IntakeWorkerPool<Q, R, S> {
    /// Create a pool over the queue, order repository, and placement service.
    pub fn new(
        queue: Arc<Q>,
        orders: Arc<R>,
        placement: Arc<PlacementService<S>>,
        config: IntakePoolConfig,
    ) -> Self {
        Self {
            queue,
            orders,
            placement,
            config,
        }
    }
}

impl<Q, R, S> IntakeWorkerPool<Q, R, S>
where
    Q: IntakeQueue + 'static,
    R: OrderRepository + 'static,
    S: ShelfOrderStore + 'static,
{
    /// Spawn the configured number of workers.
    ///
    /// Workers run until `shutdown` flips to true, finishing any in-flight
    /// placement first so no store operation is abandoned mid-call.
    pub fn spawn(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        (0..self.config.workers)
            .map(|worker| {
                let pool = self.clone();
                let mut shutdown = shutdown.clone();
                tokio::spawn(async move {
                    info!(worker, "intake worker started");
                    loop {
                        if *shutdown.borrow() {
                            break;
                        }
                        let outcome = pool.poll_once(worker).await;
                        let idle = matches!(
                            outcome,
                            IntakeOutcome::QueueEmpty | IntakeOutcome::QueueUnavailable
                        );
                        if idle {
                            tokio::select! {
                                () = tokio::time::sleep(pool.config.poll_interval) => {}
                                changed = shutdown.changed() => {
                                    // A closed channel means the sender is gone;
                                    // treat it as shutdown rather than spinning.
                                    if changed.is_err() {
                                        break;
                                    }
                                }
                            }
                        }
                    }
                    info!(worker, "intake worker stopped");
                })
            })
            .collect()
    }

    /// Dequeue and process at most one payload.
    ///
    /// Exposed separately from the loop so the drain policy is testable
    /// without spawning tasks.
    pub async fn poll_once(&self, worker: usize) -> IntakeOutcome {
        let payload = match self.queue.try_dequeue().await {
            Ok(Some(payload)) => payload,
            Ok(None) => return IntakeOutcome::QueueEmpty,
            Err(error) => {
                warn!(worker, error = %error, "failed to poll intake queue");
                return IntakeOutcome::QueueUnavailable;
            }
        };

        let Ok(order_id) = payload.parse::<OrderId>() else {
            warn!(worker, payload, "queued order id is corrupted, skipping");
            return IntakeOutcome::SkippedCorruptPayload;
        };
        debug!(worker, order_id = %order_id, "pulled order from intake queue");

        let order = match self.orders.find_by_id(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(worker, order_id = %order_id, "queued order does not exist, dropping");
                return IntakeOutcome::SkippedMissingOrder(order_id);
            }
            Err(error) => {
                warn!(worker, order_id = %order_id, error = %error, "failed to fetch order, dropping");
                return IntakeOutcome::SkippedMissingOrder(order_id);
            }
        };

        match self.placement.place(&order).await {
            Ok(shelf_order) => {
                info!(
                    worker,
                    order_id = %order_id,
                    shelf_type = %shelf_order.shelf_type,
                    "placed order on shelf"
                );
                self.trace_shelf_contents(worker).await;
                IntakeOutcome::Placed(order_id)
            }
            Err(error) if error.code() == ErrorCode::ShelfFull => {
                warn!(worker, order_id = %order_id, "kitchen is over capacity, dropping order");
                IntakeOutcome::DroppedFullShelf(order_id)
            }
            Err(error) => {
                warn!(worker, order_id = %order_id, error = %error, "failed to place order, dropping");
                IntakeOutcome::DroppedStoreError(order_id)
            }
        }
    }

    /// Best-effort occupancy trace after a placement. A failed count read
    /// only loses the log line, never the placement.
    async fn trace_shelf_contents(&self, worker: usize) {
        match self.placement.ready_counts().await {
            Ok(snapshot) => debug!(
                worker,
                hot = snapshot.hot,
                cold = snapshot.cold,
                frozen = snapshot.frozen,
                overflow = snapshot.overflow,
                "shelf contents after placement"
            ),
            Err(error) => debug!(worker, error = %error, "shelf contents unavailable"),
        }
    }
}
