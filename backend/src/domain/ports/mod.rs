//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the shelf store, order persistence, and the intake queue). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning stringly-typed results.

mod intake_queue;
mod order_repository;
mod shelf_order_store;

#[cfg(test)]
pub use intake_queue::MockIntakeQueue;
pub use intake_queue::{IntakeQueue, IntakeQueueError};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use shelf_order_store::MockShelfOrderStore;
pub use shelf_order_store::{InsertOutcome, ShelfOrderStore, ShelfOrderStoreError};
