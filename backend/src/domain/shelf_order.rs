//! Shelf occupancy data model.
//!
//! A [`ShelfOrder`] is one row per order that made it onto a shelf. Rows are
//! created by placement and only ever mutated through the store's
//! compare-and-swap, which is the sole arbiter between a driver picking the
//! order up and the sweeper declaring it waste. Rows are never deleted; the
//! table doubles as an audit trail.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Order, OrderId};

/// Shelf tier enumeration.
///
/// The first three tiers correspond to an order's temperature class; overflow
/// is the shared fallback used when the natural tier is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelfType {
    Hot,
    Cold,
    Frozen,
    Overflow,
}

impl ShelfType {
    /// All tiers, in capacity-configuration order.
    pub const ALL: [Self; 4] = [Self::Hot, Self::Cold, Self::Frozen, Self::Overflow];
}

impl fmt::Display for ShelfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hot => "hot",
            Self::Cold => "cold",
            Self::Frozen => "frozen",
            Self::Overflow => "overflow",
        };
        f.write_str(label)
    }
}

/// Lifecycle status of a shelf order.
///
/// `ReadyForPickup` is the only non-terminal state. Exactly one of the two
/// terminal transitions ever commits for a given row; the store's version
/// check enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    ReadyForPickup,
    PickedUp,
    Wasted,
}

impl OrderStatus {
    /// Whether this status ends the row's lifecycle.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PickedUp | Self::Wasted)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ReadyForPickup => "ready_for_pickup",
            Self::PickedUp => "picked_up",
            Self::Wasted => "wasted",
        };
        f.write_str(label)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ready_for_pickup" => Ok(Self::ReadyForPickup),
            "picked_up" => Ok(Self::PickedUp),
            "wasted" => Ok(Self::Wasted),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Identifier of a shelf occupancy row, independent of the order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShelfOrderId(Uuid);

impl ShelfOrderId {
    /// Wrap an existing UUID.
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`ShelfOrderId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ShelfOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One order occupying one shelf slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfOrder {
    pub id: ShelfOrderId,
    pub order_id: OrderId,
    /// Tier actually occupied; may be overflow rather than the order's
    /// natural tier.
    pub shelf_type: ShelfType,
    pub status: OrderStatus,
    /// Optimistic-concurrency token, incremented on every committed status
    /// transition.
    pub version: u32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShelfOrder {
    /// Build the row recorded when `order` lands on `shelf_type` at `now`.
    ///
    /// The row id is derived from the order id, so a queue redelivery that
    /// places the same order twice collapses onto one row at the store. The
    /// row starts at version zero in `ReadyForPickup` with
    /// `expires_at = now + ttl`. A zero TTL produces an already-expired row,
    /// which is valid: the sweeper reclaims it on its next pass.
    pub fn place(order: &Order, shelf_type: ShelfType, now: DateTime<Utc>) -> Self {
        let ttl = Duration::seconds(i64::from(order.ttl_seconds()));
        Self {
            id: ShelfOrderId::new(*order.id.as_uuid()),
            order_id: order.id,
            shelf_type,
            status: OrderStatus::ReadyForPickup,
            version: 0,
            expires_at: now + ttl,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the row has passed its deadline at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

impl fmt::Display for ShelfOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShelfType: {}, OrderStatus: {}", self.shelf_type, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Temperature;
    use rstest::rstest;

    fn sample_order(shelf_life: u32, decay_rate: f64) -> Order {
        Order::try_new(
            OrderId::random(),
            "Ice Cream",
            Temperature::Frozen,
            shelf_life,
            decay_rate,
            Utc::now(),
        )
        .expect("valid order")
    }

    #[rstest]
    fn place_stamps_ready_at_version_zero() {
        let order = sample_order(300, 0.45);
        let now = Utc::now();
        let row = ShelfOrder::place(&order, ShelfType::Frozen, now);

        assert_eq!(row.order_id, order.id);
        assert_eq!(row.id, ShelfOrderId::new(*order.id.as_uuid()));
        assert_eq!(row.status, OrderStatus::ReadyForPickup);
        assert_eq!(row.version, 0);
        assert_eq!(row.expires_at, now + Duration::seconds(206));
        assert_eq!(row.created_at, now);
    }

    #[rstest]
    fn zero_ttl_rows_are_born_expired() {
        let order = sample_order(1, 100.0);
        let now = Utc::now();
        let row = ShelfOrder::place(&order, ShelfType::Overflow, now);

        assert_eq!(row.expires_at, now);
        // expires_at < now is strict, so the row expires one instant later.
        assert!(row.is_expired(now + Duration::milliseconds(1)));
    }

    #[rstest]
    #[case(OrderStatus::ReadyForPickup, false)]
    #[case(OrderStatus::PickedUp, true)]
    #[case(OrderStatus::Wasted, true)]
    fn terminal_statuses_are_flagged(#[case] status: OrderStatus, #[case] terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
    }

    #[rstest]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::ReadyForPickup,
            OrderStatus::PickedUp,
            OrderStatus::Wasted,
        ] {
            let parsed: OrderStatus = status.to_string().parse().expect("parses");
            assert_eq!(parsed, status);
        }
    }
}
