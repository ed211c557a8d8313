//! Product catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sale item with its recipe of raw materials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unit sale price
    pub price: Decimal,
    pub image: Option<String>,
    pub recipe: Vec<RecipeLine>,
}

/// To produce one unit of a product, consume `quantity` of this material
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeLine {
    pub inventory_id: Uuid,
    pub quantity: u32,
}

impl RecipeLine {
    pub fn new(inventory_id: Uuid, quantity: u32) -> Self {
        Self {
            inventory_id,
            quantity,
        }
    }
}

/// Input for creating or replacing a product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
}
