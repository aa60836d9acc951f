//! Per-tier shelf capacity configuration.
//!
//! Capacities are read once at startup and passed explicitly into the
//! services that need them; no ambient global state. A tier is full when the
//! count of its `ready_for_pickup` rows reaches the configured capacity.

use serde::{Deserialize, Serialize};

use super::ShelfType;

/// Configured slot counts for each shelf tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfCapacities {
    pub hot: u32,
    pub cold: u32,
    pub frozen: u32,
    pub overflow: u32,
}

impl ShelfCapacities {
    /// Capacity of a single tier.
    pub const fn capacity_of(&self, shelf_type: ShelfType) -> u32 {
        match shelf_type {
            ShelfType::Hot => self.hot,
            ShelfType::Cold => self.cold,
            ShelfType::Frozen => self.frozen,
            ShelfType::Overflow => self.overflow,
        }
    }
}

impl Default for ShelfCapacities {
    fn default() -> Self {
        // Deployment defaults carried over from the original kitchen layout.
        Self {
            hot: 15,
            cold: 15,
            frozen: 15,
            overflow: 20,
        }
    }
}
