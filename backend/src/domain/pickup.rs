//! Earliest-deadline-first pickup selection.
//!
//! Serving the order closest to spoiling first minimises the worst-case
//! waste, so the selector always claims the soonest-expiring ready row. The
//! claim is a compare-and-swap: losing the race to the sweeper (or another
//! driver) is expected, and the selector re-selects exactly once before
//! reporting that nothing is available. Handing out a stale row would risk
//! double delivery, so the retry is a correctness requirement, not an
//! optimisation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ports::{
    OrderRepository, OrderRepositoryError, ShelfOrderStore, ShelfOrderStoreError,
};
use crate::domain::{Error, Order, OrderStatus};

/// Selection attempts per pickup call: the initial claim plus one retry
/// after a lost race.
const SELECTION_ATTEMPTS: u32 = 2;

/// Service handing shelved orders to drivers.
#[derive(Clone)]
pub struct PickupService<S, R> {
    store: Arc<S>,
    orders: Arc<R>,
}

impl<S, R> PickupService<S, R> {
    /// Create a pickup service over the shelf store and order repository.
    pub fn new(store: Arc<S>, orders: Arc<R>) -> Self {
        Self { store, orders }
    }
}

impl<S, R> PickupService<S, R>
where
    S: ShelfOrderStore,
    R: OrderRepository,
{
    fn map_store_error(error: ShelfOrderStoreError) -> Error {
        match error {
            ShelfOrderStoreError::Connection { message } => {
                Error::service_unavailable(format!("shelf store unavailable: {message}"))
            }
            ShelfOrderStoreError::Query { message } => {
                Error::internal(format!("shelf store error: {message}"))
            }
            ShelfOrderStoreError::NotFound { id } => {
                Error::internal(format!("selected shelf order {id} disappeared"))
            }
            ShelfOrderStoreError::VersionConflict { .. } => {
                // Handled inline by the retry loop; reaching here is a bug.
                Error::internal(format!("unhandled version conflict: {error}"))
            }
        }
    }

    fn map_repository_error(error: OrderRepositoryError) -> Error {
        match error {
            OrderRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            OrderRepositoryError::Query { message } => {
                Error::internal(format!("order repository error: {message}"))
            }
        }
    }

    /// Claim and return the next order a driver should receive.
    ///
    /// Returns an error with code [`crate::domain::ErrorCode::NotFound`]
    /// when no order is ready; callers map that to "no orders available",
    /// not an internal fault.
    pub async fn pickup(&self) -> Result<Order, Error> {
        for attempt in 0..SELECTION_ATTEMPTS {
            let Some(shelf_order) = self
                .store
                .select_earliest_ready()
                .await
                .map_err(Self::map_store_error)?
            else {
                return Err(Error::not_found("no orders ready for pickup"));
            };

            match self
                .store
                .compare_and_swap_status(shelf_order.id, shelf_order.version, OrderStatus::PickedUp)
                .await
            {
                Ok(()) => {
                    let order = self
                        .orders
                        .find_by_id(shelf_order.order_id)
                        .await
                        .map_err(Self::map_repository_error)?
                        .ok_or_else(|| {
                            Error::internal(format!(
                                "shelf order {} references missing order {}",
                                shelf_order.id, shelf_order.order_id
                            ))
                        })?;
                    info!(
                        order_id = %order.id,
                        shelf_order_id = %shelf_order.id,
                        shelf_type = %shelf_order.shelf_type,
                        "order picked up"
                    );
                    return Ok(order);
                }
                Err(error) if error.is_version_conflict() => {
                    // A concurrent claimant won between selection and CAS.
                    debug!(
                        shelf_order_id = %shelf_order.id,
                        attempt,
                        "pickup lost claim race, re-selecting"
                    );
                }
                Err(error) => return Err(Self::map_store_error(error)),
            }
        }

        Err(Error::not_found("no orders ready for pickup"))
    }
}
