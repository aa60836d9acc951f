//! Order data model.
//!
//! An [`Order`] is an immutable customer order fact: once created it is never
//! mutated, so the type exposes no setters. The only derived quantity is the
//! time-to-live, computed from the shelf life and decay rate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ShelfType;

/// Validation errors returned by [`Order::try_new`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderValidationError {
    /// Name is empty after trimming whitespace.
    #[error("order name must not be empty")]
    EmptyName,
    /// Temperature is not one of hot, cold, or frozen.
    #[error("temperature must be hot, cold, or frozen, got: {value}")]
    InvalidTemperature { value: String },
    /// Decay rate must be a finite, non-negative number.
    #[error("decay rate must be finite and non-negative, got: {value}")]
    InvalidDecayRate { value: f64 },
}

/// Stable order identifier stored as a UUID.
///
/// Clients may supply their own identifier on creation to make retries
/// idempotent; otherwise the server generates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Wrap an existing UUID.
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`OrderId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Storage temperature class of an order.
///
/// The temperature determines the order's natural shelf tier. Anything
/// outside this closed set is rejected before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Hot,
    Cold,
    Frozen,
}

impl Temperature {
    /// The shelf tier this temperature maps onto when space is available.
    pub const fn natural_shelf(self) -> ShelfType {
        match self {
            Self::Hot => ShelfType::Hot,
            Self::Cold => ShelfType::Cold,
            Self::Frozen => ShelfType::Frozen,
        }
    }
}

impl FromStr for Temperature {
    type Err = OrderValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hot" => Ok(Self::Hot),
            "cold" => Ok(Self::Cold),
            "frozen" => Ok(Self::Frozen),
            other => Err(OrderValidationError::InvalidTemperature {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hot => "hot",
            Self::Cold => "cold",
            Self::Frozen => "frozen",
        };
        f.write_str(label)
    }
}

/// Immutable customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Display name, e.g. "Cheese Pizza".
    pub name: String,
    pub temperature: Temperature,
    /// Nominal shelf life in seconds at ideal temperature.
    pub shelf_life_seconds: u32,
    /// Spoilage modifier; higher values decay faster.
    pub decay_rate: f64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Validate and construct an order.
    ///
    /// The temperature is already constrained by the [`Temperature`] type;
    /// this constructor additionally rejects empty names and nonsensical
    /// decay rates so invalid orders never reach a repository.
    pub fn try_new(
        id: OrderId,
        name: impl Into<String>,
        temperature: Temperature,
        shelf_life_seconds: u32,
        decay_rate: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OrderValidationError::EmptyName);
        }
        if !decay_rate.is_finite() || decay_rate < 0.0 {
            return Err(OrderValidationError::InvalidDecayRate { value: decay_rate });
        }
        Ok(Self {
            id,
            name,
            temperature,
            shelf_life_seconds,
            decay_rate,
            created_at,
        })
    }

    /// Seconds the order retains positive value once placed on a shelf.
    ///
    /// An order is waste once its value reaches zero, which reduces to
    /// `ttl = floor(shelf_life / (1 + decay_rate))`. The result is clamped at
    /// zero so expiry arithmetic never underflows; a zero TTL means the row
    /// is born expired and is reclaimed on the sweeper's next tick.
    pub fn ttl_seconds(&self) -> u32 {
        let ttl = (f64::from(self.shelf_life_seconds) / (1.0 + self.decay_rate)).floor();
        if ttl <= 0.0 {
            return 0;
        }
        if ttl >= f64::from(u32::MAX) {
            return u32::MAX;
        }
        // Bounds checked above; truncation is the floor we want.
        #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
        #[expect(clippy::cast_sign_loss, reason = "negative handled above")]
        let seconds = ttl as u32;
        seconds
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}, Temp: {}", self.name, self.temperature)
    }
}
