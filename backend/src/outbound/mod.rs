//! Outbound adapters implementing domain ports for infrastructure concerns.
//!
//! This module follows the hexagonal architecture pattern:
//!
//! - **persistence**: in-memory order repository and shelf store
//! - **queue**: in-memory intake FIFO
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
pub mod queue;
