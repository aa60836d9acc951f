//! Order lifecycle facade.
//!
//! [`OrderService`] is the surface the engine exposes to its collaborators:
//! the HTTP layer, the intake workers, and anything driving simulation. It
//! owns no policy of its own beyond error mapping; placement, pickup, and
//! sweeping live in their dedicated services.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use crate::domain::pickup::PickupService;
use crate::domain::placement::PlacementService;
use crate::domain::ports::{
    IntakeQueue, IntakeQueueError, OrderRepository, OrderRepositoryError, ShelfOrderStore,
    ShelfOrderStoreError,
};
use crate::domain::{Error, Order, OrderId, OrderStatus, ShelfOrder};

/// Facade over the order-lifecycle engine.
#[derive(Clone)]
pub struct OrderService<Q, R, S> {
    orders: Arc<R>,
    store: Arc<S>,
    queue: Arc<Q>,
    placement: Arc<PlacementService<S>>,
    pickup: PickupService<S, R>,
    clock: Arc<dyn Clock>,
}

impl<Q, R, S> OrderService<Q, R, S>
where
    Q: IntakeQueue,
    R: OrderRepository,
    S: ShelfOrderStore,
{
    /// Wire the facade over its ports and sub-services.
    pub fn new(
        orders: Arc<R>,
        store: Arc<S>,
        queue: Arc<Q>,
        placement: Arc<PlacementService<S>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pickup = PickupService::new(Arc::clone(&store), Arc::clone(&orders));
        Self {
            orders,
            store,
            queue,
            placement,
            pickup,
            clock,
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

    fn map_queue_error(error: IntakeQueueError) -> Error {
        match error {
            IntakeQueueError::Unavailable { message } => {
                Error::service_unavailable(format!("intake queue unavailable: {message}"))
            }
        }
    }

    fn map_store_error(error: ShelfOrderStoreError) -> Error {
        match error {
            ShelfOrderStoreError::Connection { message } => {
                Error::service_unavailable(format!("shelf store unavailable: {message}"))
            }
            ShelfOrderStoreError::Query { message } => {
                Error::internal(format!("shelf store error: {message}"))
            }
            ShelfOrderStoreError::VersionConflict { .. } | ShelfOrderStoreError::NotFound { .. } => {
                Error::conflict(error.to_string())
            }
        }
    }

    /// Persist an order fact. Idempotent by id: re-creating an existing
    /// order succeeds without touching the stored row.
    pub async fn create_order(&self, order: &Order) -> Result<OrderId, Error> {
        self.orders
            .create(order)
            .await
            .map_err(Self::map_repository_error)?;
        debug!(order_id = %order.id, "order created");
        Ok(order.id)
    }

    /// Push an order id onto the intake queue for asynchronous placement.
    pub async fn enqueue_for_placement(&self, id: OrderId) -> Result<(), Error> {
        self.queue.enqueue(id).await.map_err(Self::map_queue_error)
    }

    /// Place an order on a shelf immediately. Used by the intake workers.
    pub async fn place_order_on_shelf(&self, order: &Order) -> Result<ShelfOrder, Error> {
        self.placement.place(order).await
    }

    /// Fetch an order by id.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, Error> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))
    }

    /// Claim and return the next order for a driver, earliest deadline
    /// first.
    pub async fn pickup_order(&self) -> Result<Order, Error> {
        self.pickup.pickup().await
    }

    /// All shelved orders past their deadline right now.
    pub async fn expired_orders_on_shelf(&self) -> Result<Vec<ShelfOrder>, Error> {
        self.store
            .select_expired_ready(self.clock.utc())
            .await
            .map_err(Self::map_store_error)
    }

    /// Mark a shelf order wasted.
    ///
    /// A version conflict means a driver already claimed the row; that is
    /// the desired end state, so it is returned as success.
    pub async fn mark_order_as_wasted(&self, shelf_order: &ShelfOrder) -> Result<(), Error> {
        match self
            .store
            .compare_and_swap_status(shelf_order.id, shelf_order.version, OrderStatus::Wasted)
            .await
        {
            Ok(()) => Ok(()),
            Err(error) if error.is_version_conflict() => {
                debug!(shelf_order_id = %shelf_order.id, "order already claimed, waste mark skipped");
                Ok(())
            }
            Err(error) => Err(Self::map_store_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockIntakeQueue, MockOrderRepository, MockShelfOrderStore};
    use crate::domain::{ErrorCode, ShelfCapacities, ShelfType, Temperature};
    use chrono::Utc;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn service_with(
        queue: MockIntakeQueue,
        orders: MockOrderRepository,
        store: MockShelfOrderStore,
    ) -> OrderService<MockIntakeQueue, MockOrderRepository, MockShelfOrderStore> {
        let store = Arc::new(store);
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let placement = Arc::new(PlacementService::new(
            Arc::clone(&store),
            ShelfCapacities::default(),
            Arc::clone(&clock),
        ));
        OrderService::new(Arc::new(orders), store, Arc::new(queue), placement, clock)
    }

    fn sample_order() -> Order {
        Order::try_new(
            OrderId::random(),
            "Miso Ramen",
            Temperature::Hot,
            300,
            0.45,
            Utc::now(),
        )
        .expect("valid order")
    }

    #[rstest]
    #[tokio::test]
    async fn create_order_returns_its_id() {
        let order = sample_order();

        let mut orders = MockOrderRepository::new();
        orders.expect_create().times(1).return_once(|_| Ok(()));

        let service = service_with(MockIntakeQueue::new(), orders, MockShelfOrderStore::new());
        let id = service.create_order(&order).await.expect("created");
        assert_eq!(id, order.id);
    }

    #[rstest]
    #[tokio::test]
    async fn get_order_maps_missing_rows_to_not_found() {
        let mut orders = MockOrderRepository::new();
        orders.expect_find_by_id().times(1).return_once(|_| Ok(None));

        let service = service_with(MockIntakeQueue::new(), orders, MockShelfOrderStore::new());
        let error = service
            .get_order(OrderId::random())
            .await
            .expect_err("missing order");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_wasted_treats_conflict_as_success() {
        let order = sample_order();
        let row = ShelfOrder::place(&order, ShelfType::Hot, Utc::now());

        let mut store = MockShelfOrderStore::new();
        store
            .expect_compare_and_swap_status()
            .times(1)
            .returning(|id, version, _| Err(ShelfOrderStoreError::version_conflict(id, version)));

        let service = service_with(MockIntakeQueue::new(), MockOrderRepository::new(), store);
        service
            .mark_order_as_wasted(&row)
            .await
            .expect("conflict is a benign no-op");
    }

    #[rstest]
    #[tokio::test]
    async fn mark_wasted_surfaces_store_failures() {
        let order = sample_order();
        let row = ShelfOrder::place(&order, ShelfType::Hot, Utc::now());

        let mut store = MockShelfOrderStore::new();
        store
            .expect_compare_and_swap_status()
            .times(1)
            .returning(|_, _, _| Err(ShelfOrderStoreError::connection("refused")));

        let service = service_with(MockIntakeQueue::new(), MockOrderRepository::new(), store);
        let error = service
            .mark_order_as_wasted(&row)
            .await
            .expect_err("store failure must surface for retry");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn enqueue_maps_transport_outages() {
        let mut queue = MockIntakeQueue::new();
        queue
            .expect_enqueue()
            .times(1)
            .return_once(|_| Err(IntakeQueueError::unavailable("redis down")));

        let service = service_with(queue, MockOrderRepository::new(), MockShelfOrderStore::new());
        let error = service
            .enqueue_for_placement(OrderId::random())
            .await
            .expect_err("queue down");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
