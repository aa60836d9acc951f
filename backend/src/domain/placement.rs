//! Shelf placement algorithm.
//!
//! Routes an order to its natural tier when that tier has space, falls back
//! to the shared overflow tier, and reports capacity exhaustion when both are
//! full. Capacity is a soft bound: the count and the insert are two separate
//! atomic store operations, so concurrent placements can overshoot a tier by
//! at most the number of in-flight placements. Counts are read fresh from the
//! store on every call.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{ShelfOrderStore, ShelfOrderStoreError};
use crate::domain::{Error, Order, ShelfCapacities, ShelfOrder, ShelfType};

/// Ready-row occupancy per tier at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShelfSnapshot {
    pub hot: u32,
    pub cold: u32,
    pub frozen: u32,
    pub overflow: u32,
}

/// Service owning the placement decision.
#[derive(Clone)]
pub struct PlacementService<S> {
    store: Arc<S>,
    capacities: ShelfCapacities,
    clock: Arc<dyn Clock>,
}

impl<S> PlacementService<S> {
    /// Create a placement service over the given store and capacity map.
    pub fn new(store: Arc<S>, capacities: ShelfCapacities, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            capacities,
            clock,
        }
    }
}

impl<S> PlacementService<S>
where
    S: ShelfOrderStore,
{
    fn map_store_error(error: ShelfOrderStoreError) -> Error {
        match error {
            ShelfOrderStoreError::Connection { message } => {
                Error::service_unavailable(format!("shelf store unavailable: {message}"))
            }
            ShelfOrderStoreError::Query { message } => {
                Error::internal(format!("shelf store error: {message}"))
            }
            ShelfOrderStoreError::VersionConflict { .. } | ShelfOrderStoreError::NotFound { .. } => {
                Error::internal(format!("unexpected store outcome during placement: {error}"))
            }
        }
    }

    async fn tier_has_space(&self, tier: ShelfType) -> Result<bool, Error> {
        Ok(self.count_of(tier).await? < self.capacities.capacity_of(tier))
    }

    /// Place `order` on a shelf, creating and persisting its occupancy row.
    ///
    /// Returns the stored [`ShelfOrder`] on success, or an error with code
    /// [`crate::domain::ErrorCode::ShelfFull`] when the natural tier and the
    /// overflow tier are both at capacity. A full shelf inserts nothing.
    pub async fn place(&self, order: &Order) -> Result<ShelfOrder, Error> {
        let natural = order.temperature.natural_shelf();

        let target = if self.tier_has_space(natural).await? {
            natural
        } else if self.tier_has_space(ShelfType::Overflow).await? {
            ShelfType::Overflow
        } else {
            return Err(Error::shelf_full(format!(
                "{natural} and overflow shelves are at capacity"
            ))
            .with_details(json!({
                "orderId": order.id,
                "naturalShelf": natural.to_string(),
            })));
        };

        let shelf_order = ShelfOrder::place(order, target, self.clock.utc());
        self.store
            .insert(&shelf_order)
            .await
            .map_err(Self::map_store_error)?;

        debug!(
            order_id = %order.id,
            shelf_order_id = %shelf_order.id,
            shelf_type = %target,
            expires_at = %shelf_order.expires_at,
            "order placed on shelf"
        );
        Ok(shelf_order)
    }

    /// Ready-row counts for every tier, read fresh from the store.
    ///
    /// Used by intake workers to trace shelf contents after each placement.
    pub async fn ready_counts(&self) -> Result<ShelfSnapshot, Error> {
        Ok(ShelfSnapshot {
            hot: self.count_of(ShelfType::Hot).await?,
            cold: self.count_of(ShelfType::Cold).await?,
            frozen: self.count_of(ShelfType::Frozen).await?,
            overflow: self.count_of(ShelfType::Overflow).await?,
        })
    }

    async fn count_of(&self, tier: ShelfType) -> Result<u32, Error> {
        self.store
            .count_ready(tier)
            .await
            .map_err(Self::map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{InsertOutcome, MockShelfOrderStore};
    use crate::domain::{ErrorCode, OrderId, OrderStatus, Temperature};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    struct FixtureClock {
        now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.now
        }
    }

    fn fixture_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 14, 12, 0, 0).single().expect("valid timestamp")
    }

    fn service_with(store: MockShelfOrderStore) -> PlacementService<MockShelfOrderStore> {
        PlacementService::new(
            Arc::new(store),
            ShelfCapacities::default(),
            Arc::new(FixtureClock { now: fixture_now() }),
        )
    }

    #[fixture]
    fn hot_order() -> Order {
        Order::try_new(
            OrderId::random(),
            "Cheese Pizza",
            Temperature::Hot,
            300,
            0.45,
            fixture_now(),
        )
        .expect("valid order")
    }

    #[rstest]
    #[tokio::test]
    async fn places_on_natural_tier_when_space(hot_order: Order) {
        let mut store = MockShelfOrderStore::new();
        store
            .expect_count_ready()
            .with(eq(ShelfType::Hot))
            .times(1)
            .return_once(|_| Ok(3));
        store
            .expect_insert()
            .withf(|row| row.shelf_type == ShelfType::Hot)
            .times(1)
            .return_once(|_| Ok(InsertOutcome::Inserted));

        let placed = service_with(store)
            .place(&hot_order)
            .await
            .expect("placement succeeds");
        assert_eq!(placed.shelf_type, ShelfType::Hot);
        assert_eq!(placed.status, OrderStatus::ReadyForPickup);
        assert_eq!(placed.version, 0);
        // ttl(300, 0.45) = floor(300 / 1.45) = 206
        assert_eq!(placed.expires_at, fixture_now() + chrono::Duration::seconds(206));
    }

    #[rstest]
    #[tokio::test]
    async fn falls_back_to_overflow_when_natural_full(hot_order: Order) {
        let mut store = MockShelfOrderStore::new();
        store
            .expect_count_ready()
            .with(eq(ShelfType::Hot))
            .times(1)
            .return_once(|_| Ok(15));
        store
            .expect_count_ready()
            .with(eq(ShelfType::Overflow))
            .times(1)
            .return_once(|_| Ok(19));
        store
            .expect_insert()
            .withf(|row| row.shelf_type == ShelfType::Overflow)
            .times(1)
            .return_once(|_| Ok(InsertOutcome::Inserted));

        let placed = service_with(store)
            .place(&hot_order)
            .await
            .expect("overflow placement succeeds");
        assert_eq!(placed.shelf_type, ShelfType::Overflow);
    }

    #[rstest]
    #[tokio::test]
    async fn reports_full_shelf_without_inserting(hot_order: Order) {
        let mut store = MockShelfOrderStore::new();
        store
            .expect_count_ready()
            .with(eq(ShelfType::Hot))
            .times(1)
            .return_once(|_| Ok(15));
        store
            .expect_count_ready()
            .with(eq(ShelfType::Overflow))
            .times(1)
            .return_once(|_| Ok(20));
        store.expect_insert().times(0);

        let error = service_with(store)
            .place(&hot_order)
            .await
            .expect_err("capacity exhausted");
        assert_eq!(error.code(), ErrorCode::ShelfFull);
    }

    #[rstest]
    #[tokio::test]
    async fn snapshot_reports_every_tier() {
        let mut store = MockShelfOrderStore::new();
        for (tier, count) in [
            (ShelfType::Hot, 3),
            (ShelfType::Cold, 7),
            (ShelfType::Frozen, 0),
            (ShelfType::Overflow, 12),
        ] {
            store
                .expect_count_ready()
                .with(eq(tier))
                .times(1)
                .return_once(move |_| Ok(count));
        }

        let snapshot = service_with(store)
            .ready_counts()
            .await
            .expect("counts readable");
        assert_eq!(
            snapshot,
            ShelfSnapshot {
                hot: 3,
                cold: 7,
                frozen: 0,
                overflow: 12,
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn surfaces_store_failures_as_unavailable(hot_order: Order) {
        let mut store = MockShelfOrderStore::new();
        store
            .expect_count_ready()
            .times(1)
            .return_once(|_| Err(ShelfOrderStoreError::connection("refused")));

        let error = service_with(store)
            .place(&hot_order)
            .await
            .expect_err("store down");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
