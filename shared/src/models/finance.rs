//! Finance ledger models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UsedMaterial;

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    /// Buying raw materials; restocks inventory
    MaterialPurchase,
    #[default]
    Other,
}

/// A manually entered cash record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Always positive; direction comes from `kind`
    pub amount: Decimal,
    #[serde(default)]
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    pub description: String,
    /// Materials restocked by this purchase
    pub related_materials: Option<Vec<UsedMaterial>>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Restock lines carried by a material purchase, if any
    pub fn restock_lines(&self) -> &[UsedMaterial] {
        match (self.category, &self.related_materials) {
            (TransactionCategory::MaterialPurchase, Some(lines)) => lines,
            _ => &[],
        }
    }
}

/// Input for recording a transaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: TransactionCategory,
    #[serde(default)]
    pub description: String,
    pub related_materials: Option<Vec<UsedMaterial>>,
}
