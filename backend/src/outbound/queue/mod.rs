//! In-memory intake queue adapter.
//!
//! A mutex-guarded `VecDeque` implementing the FIFO port. Payloads are stored
//! as strings, matching the transport-level contract that dequeued entries
//! may not parse as identifiers.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::OrderId;
use crate::domain::ports::{IntakeQueue, IntakeQueueError};

/// FIFO of raw order-identifier payloads.
#[derive(Debug, Default)]
pub struct InMemoryIntakeQueue {
    entries: Mutex<VecDeque<String>>,
}

impl InMemoryIntakeQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<String>>, IntakeQueueError> {
        self.entries
            .lock()
            .map_err(|_| IntakeQueueError::unavailable("intake queue lock poisoned"))
    }
}

#[async_trait]
impl IntakeQueue for InMemoryIntakeQueue {
    async fn enqueue(&self, id: OrderId) -> Result<(), IntakeQueueError> {
        let mut entries = self.lock()?;
        entries.push_back(id.to_string());
        Ok(())
    }

    async fn try_dequeue(&self) -> Result<Option<String>, IntakeQueueError> {
        let mut entries = self.lock()?;
        Ok(entries.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn dequeue_preserves_insertion_order() {
        let queue = InMemoryIntakeQueue::new();
        let first = OrderId::random();
        let second = OrderId::random();
        queue.enqueue(first).await.expect("enqueue first");
        queue.enqueue(second).await.expect("enqueue second");

        assert_eq!(
            queue.try_dequeue().await.expect("dequeue"),
            Some(first.to_string())
        );
        assert_eq!(
            queue.try_dequeue().await.expect("dequeue"),
            Some(second.to_string())
        );
        assert_eq!(queue.try_dequeue().await.expect("dequeue"), None);
    }
}
