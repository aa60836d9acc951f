//! Port abstraction for the intake queue.
//!
//! The queue carries raw identifier payloads between order creation and the
//! worker pool. It is a plain FIFO: the only ordering guarantee the engine
//! assumes. Payloads are strings rather than parsed ids because the transport
//! may hand back corrupted data; workers parse and skip bad entries.

use async_trait::async_trait;

use crate::domain::OrderId;

/// Errors raised by queue adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeQueueError {
    /// Queue transport is unavailable or timing out.
    #[error("intake queue unavailable: {message}")]
    Unavailable { message: String },
}

impl IntakeQueueError {
    /// Helper for transport outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Port for the order-identifier FIFO between intake and placement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntakeQueue: Send + Sync {
    /// Push an order identifier onto the queue.
    async fn enqueue(&self, id: OrderId) -> Result<(), IntakeQueueError>;

    /// Pop the oldest payload, or `None` when the queue is empty.
    ///
    /// Non-blocking short-poll contract: callers sleep between empty polls
    /// rather than holding a connection open.
    async fn try_dequeue(&self) -> Result<Option<String>, IntakeQueueError>;
}
