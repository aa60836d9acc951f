//! Domain model and services for the shelf-allocation engine.
//!
//! Purpose: define the immutable order facts, the shelf occupancy rows, and
//! the services that route, claim, and reclaim them. Keep entities immutable
//! and document invariants in each type's Rustdoc; all cross-actor races are
//! arbitrated by the shelf store's compare-and-swap, never by locks held in
//! this layer.
//!
//! Public surface:
//! - [`Order`] / [`Temperature`] — immutable order facts and derived TTL.
//! - [`ShelfOrder`] / [`ShelfType`] / [`OrderStatus`] — shelf occupancy rows.
//! - [`ShelfCapacities`] — per-tier capacity configuration.
//! - [`Error`] / [`ErrorCode`] — transport-agnostic failure taxonomy.
//! - [`PlacementService`], [`PickupService`], [`ExpirationSweeper`],
//!   [`IntakeWorkerPool`], [`OrderService`] — the engine's actors.

pub mod capacity;
pub mod error;
pub mod intake;
pub mod order;
pub mod orders_service;
pub mod pickup;
pub mod placement;
pub mod ports;
pub mod shelf_order;
pub mod sweeper;

pub use self::capacity::ShelfCapacities;
pub use self::error::{Error, ErrorCode};
pub use self::intake::{IntakeOutcome, IntakePoolConfig, IntakeWorkerPool};
pub use self::order::{Order, OrderId, OrderValidationError, Temperature};
pub use self::orders_service::OrderService;
pub use self::pickup::PickupService;
pub use self::placement::{PlacementService, ShelfSnapshot};
pub use self::shelf_order::{OrderStatus, ShelfOrder, ShelfOrderId, ShelfType};
pub use self::sweeper::{ExpirationSweeper, SweepOutcome};

/// Convenient domain result alias.
pub type ApiResult<T> = Result<T, Error>;
