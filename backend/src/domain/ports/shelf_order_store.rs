//! Port abstraction for the shelf store.
//!
//! The store is the single source of truth for shelf occupancy and the sole
//! point of mutation discipline. Each operation is independently atomic;
//! [`ShelfOrderStore::compare_and_swap_status`] is the only cross-actor
//! ordering guarantee the engine relies on. Counts are always read fresh,
//! never cached, so capacity decisions cannot act on stale state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{OrderStatus, ShelfOrder, ShelfOrderId, ShelfType};

/// Errors raised by shelf store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShelfOrderStoreError {
    /// Store connection could not be established.
    #[error("shelf store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("shelf store query failed: {message}")]
    Query { message: String },
    /// The stored version differed from the caller's expectation; a
    /// concurrent actor already claimed the row. No side effects occurred.
    #[error("version conflict on shelf order {id}: expected version {expected_version}")]
    VersionConflict {
        id: ShelfOrderId,
        expected_version: u32,
    },
    /// No row exists for the given id.
    #[error("shelf order {id} not found")]
    NotFound { id: ShelfOrderId },
}

impl ShelfOrderStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for lost optimistic-concurrency races.
    pub const fn version_conflict(id: ShelfOrderId, expected_version: u32) -> Self {
        Self::VersionConflict {
            id,
            expected_version,
        }
    }

    /// Helper for missing rows.
    pub const fn not_found(id: ShelfOrderId) -> Self {
        Self::NotFound { id }
    }

    /// Whether this error is the benign already-claimed outcome rather than
    /// an infrastructure failure.
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created.
    Inserted,
    /// A row with this id already existed; nothing changed. Supports
    /// at-least-once delivery from the intake queue.
    DuplicateIgnored,
}

/// Port for durable shelf occupancy state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShelfOrderStore: Send + Sync {
    /// Count `ready_for_pickup` rows on a tier.
    async fn count_ready(&self, shelf_type: ShelfType) -> Result<u32, ShelfOrderStoreError>;

    /// Insert a shelf order row; duplicate ids are ignored.
    async fn insert(&self, shelf_order: &ShelfOrder)
    -> Result<InsertOutcome, ShelfOrderStoreError>;

    /// Transition a row's status, guarded by its version.
    ///
    /// Commits the new status and increments the version only when the
    /// stored version equals `expected_version`; otherwise fails with
    /// [`ShelfOrderStoreError::VersionConflict`] and no side effects. Status
    /// and version always change together; `updated_at` is refreshed on
    /// commit.
    async fn compare_and_swap_status(
        &self,
        id: ShelfOrderId,
        expected_version: u32,
        new_status: OrderStatus,
    ) -> Result<(), ShelfOrderStoreError>;

    /// The `ready_for_pickup` row with the smallest `expires_at`.
    ///
    /// Ties break by `created_at` ascending, then id ascending, so selection
    /// is deterministic.
    async fn select_earliest_ready(&self) -> Result<Option<ShelfOrder>, ShelfOrderStoreError>;

    /// All `ready_for_pickup` rows with `expires_at < now`.
    async fn select_expired_ready(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ShelfOrder>, ShelfOrderStoreError>;
}
