//! Periodic reclamation of expired shelf orders.
//!
//! The sweeper finds `ready_for_pickup` rows past their deadline and marks
//! them wasted through the store's compare-and-swap. A version conflict means
//! a driver claimed the order in the race window; the desired end state
//! already holds, so conflicts count as success. Store failures while marking
//! waste are the one failure class the engine never drops silently: the row
//! stays expired and the next tick retries it, because unmarked waste risks
//! serving spoiled product.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ports::ShelfOrderStore;
use crate::domain::{Error, OrderStatus};

/// Counters describing one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOutcome {
    /// Expired rows the pass examined.
    pub expired: usize,
    /// Rows transitioned to wasted.
    pub wasted: usize,
    /// Rows a concurrent pickup claimed first; already terminal.
    pub already_claimed: usize,
    /// Rows whose waste transition hit a store failure; retried next tick.
    pub failed: usize,
}

/// Background actor reclaiming space from decayed orders.
#[derive(Clone)]
pub struct ExpirationSweeper<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ExpirationSweeper<S> {
    /// Create a sweeper over the given store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> ExpirationSweeper<S>
where
    S: ShelfOrderStore,
{
    /// Run one sweep pass at the clock's current time.
    ///
    /// Fails only when the expired-row read itself fails; the caller skips
    /// the tick and retries on the next one. Individual waste transitions
    /// never fail the pass.
    pub async fn sweep(&self) -> Result<SweepOutcome, Error> {
        let now = self.clock.utc();
        let expired = self
            .store
            .select_expired_ready(now)
            .await
            .map_err(|error| Error::service_unavailable(format!("expired-row read failed: {error}")))?;

        let mut outcome = SweepOutcome {
            expired: expired.len(),
            ..SweepOutcome::default()
        };

        for shelf_order in expired {
            match self
                .store
                .compare_and_swap_status(shelf_order.id, shelf_order.version, OrderStatus::Wasted)
                .await
            {
                Ok(()) => {
                    outcome.wasted += 1;
                    info!(
                        shelf_order_id = %shelf_order.id,
                        order_id = %shelf_order.order_id,
                        shelf_type = %shelf_order.shelf_type,
                        expired_at = %shelf_order.expires_at,
                        "marked expired order as wasted"
                    );
                }
                Err(error) if error.is_version_conflict() => {
                    // Picked up in the race window; nothing left to reclaim.
                    outcome.already_claimed += 1;
                    debug!(
                        shelf_order_id = %shelf_order.id,
                        "expired order already claimed, skipping"
                    );
                }
                Err(error) => {
                    outcome.failed += 1;
                    warn!(
                        shelf_order_id = %shelf_order.id,
                        error = %error,
                        "failed to mark order as wasted, will retry next sweep"
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// Sweep on a fixed interval until `shutdown` flips to true.
    ///
    /// A failed read skips the tick. Shutdown waits for the in-flight pass
    /// to finish so no compare-and-swap is abandoned mid-transition.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep().await {
                        Ok(outcome) if outcome.expired > 0 => {
                            debug!(
                                expired = outcome.expired,
                                wasted = outcome.wasted,
                                already_claimed = outcome.already_claimed,
                                failed = outcome.failed,
                                "sweep pass complete"
                            );
                        }
                        Ok(_) => {}
                        Err(error) => {
                            warn!(error = %error, "sweep pass skipped, retrying next tick");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    // A closed channel means the sender is gone; stop rather
                    // than spinning on the cancelled arm.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("expiration sweeper shutting down");
                        return;
                    }
                }
            }
        }
    }
}
