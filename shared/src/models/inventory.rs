//! Raw material inventory models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw material held in stock (roses, wrapping paper, ribbon...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    /// On-hand quantity, never negative
    pub quantity: u32,
    /// Unit label (stem, sheet, metre, bunch...)
    pub unit: String,
    pub import_price: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a material to the ledger
#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    pub import_price: Option<Decimal>,
}

/// Partial update of a material; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub unit: Option<String>,
    pub import_price: Option<Decimal>,
}

/// A quantity of one material, as consumed by an order or bought by a purchase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsedMaterial {
    pub inventory_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: u32,
}

impl UsedMaterial {
    pub fn new(
        inventory_id: Uuid,
        name: impl Into<String>,
        unit: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            inventory_id,
            name: name.into(),
            unit: unit.into(),
            quantity,
        }
    }
}

/// Per-material record of what an order has taken out of stock.
///
/// `requested` is the quantity the order accounts for; `removed` is what
/// actually left the ledger. They differ only when a deduction was clamped
/// at zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeductedMaterial {
    pub inventory_id: Uuid,
    pub requested: u32,
    pub removed: u32,
}

impl DeductedMaterial {
    /// Quantity requested but never taken from stock
    pub fn shortfall(&self) -> u32 {
        self.requested.saturating_sub(self.removed)
    }
}
