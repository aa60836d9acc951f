//! In-process persistence adapters.
//!
//! Concrete implementations of the order repository and shelf store ports,
//! backed by mutex-guarded maps. Adapters are thin translators of port
//! contracts into data-structure operations; no business logic resides here.

mod in_memory_order_repository;
mod in_memory_shelf_order_store;

pub use in_memory_order_repository::InMemoryOrderRepository;
pub use in_memory_shelf_order_store::InMemoryShelfOrderStore;
