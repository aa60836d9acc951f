//! In-memory shelf store adapter.
//!
//! Backs the [`ShelfOrderStore`] port with a mutex-guarded map. Every port
//! operation takes the lock once and releases it before returning, so each
//! call is atomic exactly as the contract requires; in particular the version
//! check and the status write of the compare-and-swap happen under a single
//! lock hold. Rows are never deleted, preserving the audit trail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{InsertOutcome, ShelfOrderStore, ShelfOrderStoreError};
use crate::domain::{OrderStatus, ShelfOrder, ShelfOrderId, ShelfType};

/// Mutex-guarded map implementing the shelf store contract.
pub struct InMemoryShelfOrderStore {
    rows: Mutex<HashMap<ShelfOrderId, ShelfOrder>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryShelfOrderStore {
    /// Create an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ShelfOrderId, ShelfOrder>>, ShelfOrderStoreError>
    {
        self.rows
            .lock()
            .map_err(|_| ShelfOrderStoreError::query("shelf store lock poisoned"))
    }

    fn is_ready(row: &ShelfOrder) -> bool {
        row.status == OrderStatus::ReadyForPickup
    }
}

#[async_trait]
impl ShelfOrderStore for InMemoryShelfOrderStore {
    async fn count_ready(&self, shelf_type: ShelfType) -> Result<u32, ShelfOrderStoreError> {
        let rows = self.lock()?;
        let count = rows
            .values()
            .filter(|row| row.shelf_type == shelf_type && Self::is_ready(row))
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn insert(
        &self,
        shelf_order: &ShelfOrder,
    ) -> Result<InsertOutcome, ShelfOrderStoreError> {
        let mut rows = self.lock()?;
        if rows.contains_key(&shelf_order.id) {
            return Ok(InsertOutcome::DuplicateIgnored);
        }
        rows.insert(shelf_order.id, shelf_order.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn compare_and_swap_status(
        &self,
        id: ShelfOrderId,
        expected_version: u32,
        new_status: OrderStatus,
    ) -> Result<(), ShelfOrderStoreError> {
        let now = self.clock.utc();
        let mut rows = self.lock()?;
        let row = rows
            .get_mut(&id)
            .ok_or(ShelfOrderStoreError::not_found(id))?;
        if row.version != expected_version {
            return Err(ShelfOrderStoreError::version_conflict(id, expected_version));
        }
        row.status = new_status;
        row.version += 1;
        row.updated_at = now;
        Ok(())
    }

    async fn select_earliest_ready(&self) -> Result<Option<ShelfOrder>, ShelfOrderStoreError> {
        let rows = self.lock()?;
        let earliest = rows
            .values()
            .filter(|row| Self::is_ready(row))
            .min_by_key(|row| (row.expires_at, row.created_at, row.id))
            .cloned();
        Ok(earliest)
    }

    async fn select_expired_ready(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ShelfOrder>, ShelfOrderStoreError> {
        let rows = self.lock()?;
        let mut expired: Vec<ShelfOrder> = rows
            .values()
            .filter(|row| Self::is_ready(row) && row.expires_at < now)
            .cloned()
            .collect();
        // Deterministic sweep order for logs and tests.
        expired.sort_by_key(|row| (row.expires_at, row.created_at, row.id));
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderId, Temperature};
    use chrono::Duration;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn store() -> Arc<InMemoryShelfOrderStore> {
        Arc::new(InMemoryShelfOrderStore::new(Arc::new(DefaultClock)))
    }

    fn row_expiring_in(seconds: i64) -> ShelfOrder {
        let now = Utc::now();
        let order = Order::try_new(
            OrderId::random(),
            "Banh Mi",
            Temperature::Cold,
            300,
            0.45,
            now,
        )
        .expect("valid order");
        let mut row = ShelfOrder::place(&order, ShelfType::Cold, now);
        row.expires_at = now + Duration::seconds(seconds);
        row
    }

    #[rstest]
    #[tokio::test]
    async fn insert_is_idempotent_by_id() {
        let store = store();
        let row = row_expiring_in(10);

        assert_eq!(
            store.insert(&row).await.expect("first insert"),
            InsertOutcome::Inserted
        );

        let mut mutated = row.clone();
        mutated.shelf_type = ShelfType::Overflow;
        assert_eq!(
            store.insert(&mutated).await.expect("second insert"),
            InsertOutcome::DuplicateIgnored
        );

        // The stored row is the original, untouched.
        let stored = store
            .select_earliest_ready()
            .await
            .expect("select")
            .expect("row present");
        assert_eq!(stored.shelf_type, ShelfType::Cold);
        assert_eq!(store.count_ready(ShelfType::Cold).await.expect("count"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn count_ready_excludes_terminal_rows() {
        let store = store();
        let row = row_expiring_in(10);
        store.insert(&row).await.expect("insert");
        assert_eq!(store.count_ready(ShelfType::Cold).await.expect("count"), 1);

        store
            .compare_and_swap_status(row.id, 0, OrderStatus::PickedUp)
            .await
            .expect("claim");
        assert_eq!(store.count_ready(ShelfType::Cold).await.expect("count"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn earliest_ready_prefers_soonest_deadline() {
        let store = store();
        let later = row_expiring_in(10);
        let sooner = row_expiring_in(5);
        store.insert(&later).await.expect("insert later");
        store.insert(&sooner).await.expect("insert sooner");

        let selected = store
            .select_earliest_ready()
            .await
            .expect("select")
            .expect("row present");
        assert_eq!(selected.id, sooner.id);
    }

    #[rstest]
    #[tokio::test]
    async fn earliest_ready_ties_break_deterministically() {
        let store = store();
        let now = Utc::now();
        let mut a = row_expiring_in(5);
        let mut b = row_expiring_in(5);
        a.expires_at = now;
        b.expires_at = now;
        a.created_at = now;
        b.created_at = now;
        store.insert(&a).await.expect("insert a");
        store.insert(&b).await.expect("insert b");

        let expected = a.id.min(b.id);
        let selected = store
            .select_earliest_ready()
            .await
            .expect("select")
            .expect("row present");
        assert_eq!(selected.id, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn cas_increments_version_exactly_once() {
        let store = store();
        let row = row_expiring_in(10);
        store.insert(&row).await.expect("insert");

        store
            .compare_and_swap_status(row.id, 0, OrderStatus::Wasted)
            .await
            .expect("first transition");

        // The version moved on; the stale token loses.
        let err = store
            .compare_and_swap_status(row.id, 0, OrderStatus::PickedUp)
            .await
            .expect_err("stale version");
        assert!(err.is_version_conflict());
    }

    #[rstest]
    #[tokio::test]
    async fn cas_on_missing_row_reports_not_found() {
        let store = store();
        let err = store
            .compare_and_swap_status(ShelfOrderId::random(), 0, OrderStatus::Wasted)
            .await
            .expect_err("missing row");
        assert!(matches!(err, ShelfOrderStoreError::NotFound { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn racing_claims_commit_exactly_one_transition() {
        let store = store();
        let row = row_expiring_in(10);
        store.insert(&row).await.expect("insert");

        let pickup_store = Arc::clone(&store);
        let sweep_store = Arc::clone(&store);
        let id = row.id;
        let (pickup, waste) = tokio::join!(
            tokio::spawn(async move {
                pickup_store
                    .compare_and_swap_status(id, 0, OrderStatus::PickedUp)
                    .await
            }),
            tokio::spawn(async move {
                sweep_store
                    .compare_and_swap_status(id, 0, OrderStatus::Wasted)
                    .await
            }),
        );
        let pickup = pickup.expect("task ran");
        let waste = waste.expect("task ran");

        assert!(
            pickup.is_ok() ^ waste.is_ok(),
            "exactly one claimant must win, got pickup={pickup:?} waste={waste:?}"
        );
        let loser = if pickup.is_ok() { waste } else { pickup };
        assert!(loser.expect_err("loser conflicts").is_version_conflict());

        // Version advanced exactly once and the status is a single terminal.
        let err = store
            .compare_and_swap_status(id, 0, OrderStatus::Wasted)
            .await
            .expect_err("version 0 is stale");
        assert!(err.is_version_conflict());
        assert_eq!(store.count_ready(ShelfType::Cold).await.expect("count"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn expired_selection_is_strict_and_sorted() {
        let store = store();
        let now = Utc::now();
        let mut boundary = row_expiring_in(0);
        boundary.expires_at = now;
        let old = row_expiring_in(-10);
        let older = row_expiring_in(-20);
        store.insert(&boundary).await.expect("insert boundary");
        store.insert(&old).await.expect("insert old");
        store.insert(&older).await.expect("insert older");

        let expired = store.select_expired_ready(now).await.expect("select");
        // expires_at == now is not yet expired; comparison is strict.
        let ids: Vec<_> = expired.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![older.id, old.id]);
    }
}
