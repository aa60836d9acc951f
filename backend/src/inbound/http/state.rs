//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the order-lifecycle facade and remain testable without real
//! infrastructure.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::OrderService;
use crate::outbound::persistence::{InMemoryOrderRepository, InMemoryShelfOrderStore};
use crate::outbound::queue::InMemoryIntakeQueue;

/// The facade as wired against the in-process adapters.
pub type KitchenOrderService =
    OrderService<InMemoryIntakeQueue, InMemoryOrderRepository, InMemoryShelfOrderStore>;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub orders: Arc<KitchenOrderService>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Bundle the order facade and clock for handler injection.
    pub fn new(orders: Arc<KitchenOrderService>, clock: Arc<dyn Clock>) -> Self {
        Self { orders, clock }
    }
}
