//! In-memory order catalogue adapter.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderId};

/// Mutex-guarded map of accepted orders keyed by id.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    rows: Mutex<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<OrderId, Order>>, OrderRepositoryError> {
        self.rows
            .lock()
            .map_err(|_| OrderRepositoryError::query("order repository lock poisoned"))
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut rows = self.lock()?;
        // Re-delivery of an already accepted order is a no-op.
        rows.entry(order.id).or_insert_with(|| order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let rows = self.lock()?;
        Ok(rows.get(&id).cloned())
    }
}
